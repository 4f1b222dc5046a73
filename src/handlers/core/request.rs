//! The request a command was invoked through.
//!
//! Prefix messages and slash interactions reply differently (a channel
//! message vs. an interaction response that may be private). Handlers only
//! see this trait; the adapters live in [`crate::platform::events`].

use crate::platform::{ChannelId, GatewayResult, GuildId, UserId};
use async_trait::async_trait;

#[async_trait]
pub trait Request: Send + Sync {
    fn requester_id(&self) -> UserId;
    /// `None` for direct messages.
    fn guild_id(&self) -> Option<GuildId>;
    fn channel_id(&self) -> ChannelId;

    /// Answer the invocation. `ephemeral` is honored where the platform can.
    ///
    /// Once a reply has been sent (or deferred), further replies go out as
    /// follow-ups.
    async fn reply(&mut self, content: &str, ephemeral: bool) -> GatewayResult<()>;

    /// Acknowledge now and answer later with [`Request::follow_up`].
    async fn defer_reply(&mut self, ephemeral: bool) -> GatewayResult<()>;

    /// Send an additional message after the first reply.
    async fn follow_up(&mut self, content: &str, ephemeral: bool) -> GatewayResult<()>;
}
