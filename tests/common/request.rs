//! Recording request adapter.

use async_trait::async_trait;
use rosterd::handlers::Request;
use rosterd::platform::{ChannelId, GatewayResult, GuildId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    pub ephemeral: bool,
    /// Sent after the first reply or a defer.
    pub follow_up: bool,
}

pub struct FakeRequest {
    pub requester: UserId,
    pub guild: Option<GuildId>,
    pub channel: ChannelId,
    pub replies: Vec<Reply>,
    pub deferred: bool,
}

impl FakeRequest {
    pub fn new(requester: UserId, guild: GuildId, channel: ChannelId) -> Self {
        Self {
            requester,
            guild: Some(guild),
            channel,
            replies: Vec::new(),
            deferred: false,
        }
    }

    /// A direct message, outside any guild.
    pub fn direct(requester: UserId, channel: ChannelId) -> Self {
        Self {
            guild: None,
            ..Self::new(requester, GuildId(0), channel)
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.replies.iter().map(|r| r.content.as_str()).collect()
    }

    pub fn last(&self) -> &str {
        self.replies.last().map(|r| r.content.as_str()).unwrap_or("")
    }

    fn answered(&self) -> bool {
        self.deferred || !self.replies.is_empty()
    }
}

#[async_trait]
impl Request for FakeRequest {
    fn requester_id(&self) -> UserId {
        self.requester
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.guild
    }

    fn channel_id(&self) -> ChannelId {
        self.channel
    }

    async fn reply(&mut self, content: &str, ephemeral: bool) -> GatewayResult<()> {
        let follow_up = self.answered();
        self.replies.push(Reply {
            content: content.to_string(),
            ephemeral,
            follow_up,
        });
        Ok(())
    }

    async fn defer_reply(&mut self, _ephemeral: bool) -> GatewayResult<()> {
        self.deferred = true;
        Ok(())
    }

    async fn follow_up(&mut self, content: &str, ephemeral: bool) -> GatewayResult<()> {
        self.reply(content, ephemeral).await
    }
}
