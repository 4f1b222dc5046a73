//! Command handler context.
//!
//! Defines the `Context<'a>` struct passed to all handlers.

use super::args::CommandArgs;
use super::request::Request;
use crate::error::BotResult;
use crate::platform::{ChannelId, Gateway, GuildId, Permission, UserId};
use crate::state::Session;
use tracing::warn;

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// Shared bot state.
    pub session: &'a Session,
    /// Remote platform operations.
    pub gateway: &'a dyn Gateway,
    /// Where replies go.
    pub request: &'a mut dyn Request,
    /// Arguments bound to the handler's declared parameters.
    pub args: CommandArgs,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    /// Who invoked the command.
    pub requester: UserId,
}

impl<'a> Context<'a> {
    pub fn new(
        session: &'a Session,
        gateway: &'a dyn Gateway,
        request: &'a mut dyn Request,
        guild_id: GuildId,
        args: CommandArgs,
    ) -> Self {
        let requester = request.requester_id();
        let channel_id = request.channel_id();
        Self {
            session,
            gateway,
            request,
            args,
            guild_id,
            channel_id,
            requester,
        }
    }

    /// Public reply.
    pub async fn reply(&mut self, content: &str) -> BotResult {
        self.request.reply(content, false).await?;
        Ok(())
    }

    /// Reply only the requester can see (slash commands only).
    pub async fn reply_private(&mut self, content: &str) -> BotResult {
        self.request.reply(content, true).await?;
        Ok(())
    }

    pub async fn follow_up(&mut self, content: &str, ephemeral: bool) -> BotResult {
        self.request.follow_up(content, ephemeral).await?;
        Ok(())
    }

    pub fn is_admin(&self) -> bool {
        self.session.config.bot.is_admin(self.requester)
    }

    /// Admin ids pass every check; everyone else needs the guild permission.
    pub async fn has_permission(&self, permission: Permission) -> BotResult<bool> {
        if self.is_admin() {
            return Ok(true);
        }
        Ok(self
            .gateway
            .has_permission(self.guild_id, self.requester, permission)
            .await?)
    }

    /// Post to the moderation log channel, if one is configured.
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn log_action(&self, content: &str) {
        let Some(channel) = self.session.config.bot.log_channel_id else {
            return;
        };
        if let Err(e) = self.gateway.send_message(channel, content).await {
            warn!(channel = %channel, error = %e, "Failed to post to log channel");
        }
    }
}
