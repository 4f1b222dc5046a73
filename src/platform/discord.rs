//! Discord gateway over serenity's HTTP client.

use super::{
    ChannelId, Gateway, GatewayError, GatewayResult, GuildId, MemberInfo, MessageId, NewRole,
    Permission, RoleId, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::builder::{
    CreateChannel, CreateMessage, EditChannel, EditMember, EditRole, GetMessages,
};
use serenity::http::{Http, HttpError};
use serenity::model::channel::{ChannelType, PermissionOverwrite, PermissionOverwriteType};
use serenity::model::guild::Member;
use serenity::model::id as sid;
use serenity::model::permissions::Permissions;
use serenity::model::Timestamp;
use std::num::NonZeroU64;
use std::sync::Arc;
use tracing::debug;

/// Page size for member listing (platform maximum).
const MEMBER_PAGE: u64 = 1000;

/// Most messages a single bulk delete accepts.
const MAX_PURGE: u64 = 100;

/// Convert a local id into a serenity id. Zero is never a valid snowflake.
fn snowflake<T: From<NonZeroU64>>(raw: u64, what: &str) -> GatewayResult<T> {
    NonZeroU64::new(raw)
        .map(T::from)
        .ok_or_else(|| GatewayError::NotFound(format!("{what} 0")))
}

fn map_err(action: &str, e: serenity::Error) -> GatewayError {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) = &e {
        let detail = format!("{action}: {}", response.error.message);
        match response.status_code.as_u16() {
            403 => return GatewayError::PermissionDenied(detail),
            404 => return GatewayError::NotFound(detail),
            _ => {}
        }
    }
    GatewayError::Other(format!("{action}: {e}"))
}

fn permission_bits(permission: Permission) -> Permissions {
    match permission {
        Permission::Administrator => Permissions::ADMINISTRATOR,
        Permission::ModerateMembers => Permissions::MODERATE_MEMBERS,
        Permission::ManageChannels => Permissions::MANAGE_CHANNELS,
        Permission::ManageMessages => Permissions::MANAGE_MESSAGES,
        Permission::ManageRoles => Permissions::MANAGE_ROLES,
        Permission::BanMembers => Permissions::BAN_MEMBERS,
        Permission::KickMembers => Permissions::KICK_MEMBERS,
    }
}

fn member_info(member: &Member) -> MemberInfo {
    MemberInfo {
        user_id: UserId(member.user.id.get()),
        username: member.user.name.clone(),
        display_name: member.display_name().to_string(),
        roles: member.roles.iter().map(|r| RoleId(r.get())).collect(),
        is_bot: member.user.bot,
    }
}

/// [`Gateway`] backed by the Discord REST API.
#[derive(Clone)]
pub struct DiscordGateway {
    http: Arc<Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }

    /// The current @everyone overwrite on `channel`, or an empty one.
    async fn everyone_overwrite(
        &self,
        guild: GuildId,
        channel: sid::ChannelId,
    ) -> GatewayResult<PermissionOverwrite> {
        let everyone: sid::RoleId = snowflake(guild.everyone_role().get(), "role")?;
        let existing = self
            .http
            .get_channel(channel)
            .await
            .map_err(|e| map_err("fetch channel", e))?
            .guild()
            .and_then(|c| {
                c.permission_overwrites
                    .into_iter()
                    .find(|o| o.kind == PermissionOverwriteType::Role(everyone))
            });
        Ok(existing.unwrap_or(PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Role(everyone),
        }))
    }

    /// Flip one @everyone permission on a channel, keeping the others.
    async fn set_everyone_permission(
        &self,
        guild: GuildId,
        channel: ChannelId,
        bits: Permissions,
        allowed: bool,
    ) -> GatewayResult<()> {
        let channel: sid::ChannelId = snowflake(channel.get(), "channel")?;
        let mut overwrite = self.everyone_overwrite(guild, channel).await?;
        if allowed {
            overwrite.deny.remove(bits);
            overwrite.allow.insert(bits);
        } else {
            overwrite.allow.remove(bits);
            overwrite.deny.insert(bits);
        }
        channel
            .create_permission(self.http.as_ref(), overwrite)
            .await
            .map_err(|e| map_err("edit channel permissions", e))
    }
}

#[async_trait]
impl Gateway for DiscordGateway {
    async fn member(&self, guild: GuildId, user: UserId) -> GatewayResult<MemberInfo> {
        let guild: sid::GuildId = snowflake(guild.get(), "guild")?;
        let user: sid::UserId = snowflake(user.get(), "user")?;
        let member = self
            .http
            .get_member(guild, user)
            .await
            .map_err(|e| map_err("fetch member", e))?;
        Ok(member_info(&member))
    }

    async fn members(&self, guild: GuildId) -> GatewayResult<Vec<MemberInfo>> {
        let guild: sid::GuildId = snowflake(guild.get(), "guild")?;
        let mut all = Vec::new();
        let mut after = None;
        loop {
            let page = self
                .http
                .get_guild_members(guild, Some(MEMBER_PAGE), after)
                .await
                .map_err(|e| map_err("list members", e))?;
            let full = page.len() as u64 == MEMBER_PAGE;
            after = page.last().map(|m| m.user.id.get());
            all.extend(page.iter().map(member_info));
            if !full {
                break;
            }
        }
        debug!(guild = %guild, count = all.len(), "Fetched guild members");
        Ok(all)
    }

    async fn guild_owner(&self, guild: GuildId) -> GatewayResult<UserId> {
        let guild: sid::GuildId = snowflake(guild.get(), "guild")?;
        let partial = self
            .http
            .get_guild(guild)
            .await
            .map_err(|e| map_err("fetch guild", e))?;
        Ok(UserId(partial.owner_id.get()))
    }

    async fn has_permission(
        &self,
        guild: GuildId,
        user: UserId,
        permission: Permission,
    ) -> GatewayResult<bool> {
        let guild_id: sid::GuildId = snowflake(guild.get(), "guild")?;
        let user_id: sid::UserId = snowflake(user.get(), "user")?;
        let partial = self
            .http
            .get_guild(guild_id)
            .await
            .map_err(|e| map_err("fetch guild", e))?;
        if partial.owner_id == user_id {
            return Ok(true);
        }
        let member = self
            .http
            .get_member(guild_id, user_id)
            .await
            .map_err(|e| map_err("fetch member", e))?;

        let everyone: sid::RoleId = snowflake(guild.everyone_role().get(), "role")?;
        let granted = std::iter::once(&everyone)
            .chain(member.roles.iter())
            .filter_map(|id| partial.roles.get(id))
            .fold(Permissions::empty(), |acc, role| acc | role.permissions);

        Ok(granted.contains(Permissions::ADMINISTRATOR)
            || granted.contains(permission_bits(permission)))
    }

    async fn add_role(&self, guild: GuildId, user: UserId, role: RoleId) -> GatewayResult<()> {
        self.http
            .add_member_role(
                snowflake(guild.get(), "guild")?,
                snowflake(user.get(), "user")?,
                snowflake(role.get(), "role")?,
                None,
            )
            .await
            .map_err(|e| map_err("add role", e))
    }

    async fn remove_role(&self, guild: GuildId, user: UserId, role: RoleId) -> GatewayResult<()> {
        self.http
            .remove_member_role(
                snowflake(guild.get(), "guild")?,
                snowflake(user.get(), "user")?,
                snowflake(role.get(), "role")?,
                None,
            )
            .await
            .map_err(|e| map_err("remove role", e))
    }

    async fn set_nickname(&self, guild: GuildId, user: UserId, nick: &str) -> GatewayResult<()> {
        let guild: sid::GuildId = snowflake(guild.get(), "guild")?;
        let user: sid::UserId = snowflake(user.get(), "user")?;
        guild
            .edit_member(self.http.as_ref(), user, EditMember::new().nickname(nick))
            .await
            .map(|_| ())
            .map_err(|e| map_err("set nickname", e))
    }

    async fn send_message(&self, channel: ChannelId, content: &str) -> GatewayResult<MessageId> {
        let channel: sid::ChannelId = snowflake(channel.get(), "channel")?;
        let message = channel
            .send_message(self.http.as_ref(), CreateMessage::new().content(content))
            .await
            .map_err(|e| map_err("send message", e))?;
        Ok(MessageId(message.id.get()))
    }

    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> GatewayResult<()> {
        let channel: sid::ChannelId = snowflake(channel.get(), "channel")?;
        let message: sid::MessageId = snowflake(message.get(), "message")?;
        channel
            .delete_message(self.http.as_ref(), message)
            .await
            .map_err(|e| map_err("delete message", e))
    }

    async fn send_direct(&self, user: UserId, content: &str) -> GatewayResult<()> {
        let user: sid::UserId = snowflake(user.get(), "user")?;
        let dm = user
            .create_dm_channel(self.http.as_ref())
            .await
            .map_err(|e| map_err("open DM", e))?;
        dm.id
            .send_message(self.http.as_ref(), CreateMessage::new().content(content))
            .await
            .map(|_| ())
            .map_err(|e| map_err("send DM", e))
    }

    async fn purge(&self, channel: ChannelId, limit: u64) -> GatewayResult<usize> {
        let channel: sid::ChannelId = snowflake(channel.get(), "channel")?;
        let limit = limit.clamp(1, MAX_PURGE) as u8;
        let messages = channel
            .messages(self.http.as_ref(), GetMessages::new().limit(limit))
            .await
            .map_err(|e| map_err("fetch messages", e))?;
        let ids: Vec<sid::MessageId> = messages.iter().map(|m| m.id).collect();
        match ids.as_slice() {
            [] => {}
            [single] => channel
                .delete_message(self.http.as_ref(), *single)
                .await
                .map_err(|e| map_err("delete message", e))?,
            _ => channel
                .delete_messages(self.http.as_ref(), &ids)
                .await
                .map_err(|e| map_err("bulk delete", e))?,
        }
        Ok(ids.len())
    }

    async fn timeout(
        &self,
        guild: GuildId,
        user: UserId,
        until: DateTime<Utc>,
        reason: &str,
    ) -> GatewayResult<()> {
        let guild: sid::GuildId = snowflake(guild.get(), "guild")?;
        let user: sid::UserId = snowflake(user.get(), "user")?;
        let until = Timestamp::from_unix_timestamp(until.timestamp())
            .map_err(|e| GatewayError::Other(format!("timeout: {e}")))?;
        let edit = EditMember::new()
            .disable_communication_until_datetime(until)
            .audit_log_reason(reason);
        guild
            .edit_member(self.http.as_ref(), user, edit)
            .await
            .map(|_| ())
            .map_err(|e| map_err("timeout member", e))
    }

    async fn ban(&self, guild: GuildId, user: UserId, reason: &str) -> GatewayResult<()> {
        let guild: sid::GuildId = snowflake(guild.get(), "guild")?;
        let user: sid::UserId = snowflake(user.get(), "user")?;
        guild
            .ban_with_reason(self.http.as_ref(), user, 0, reason)
            .await
            .map_err(|e| map_err("ban", e))
    }

    async fn unban(&self, guild: GuildId, user: UserId) -> GatewayResult<()> {
        let guild: sid::GuildId = snowflake(guild.get(), "guild")?;
        let user: sid::UserId = snowflake(user.get(), "user")?;
        guild
            .unban(self.http.as_ref(), user)
            .await
            .map_err(|e| map_err("unban", e))
    }

    async fn kick(&self, guild: GuildId, user: UserId, reason: &str) -> GatewayResult<()> {
        let guild: sid::GuildId = snowflake(guild.get(), "guild")?;
        let user: sid::UserId = snowflake(user.get(), "user")?;
        guild
            .kick_with_reason(self.http.as_ref(), user, reason)
            .await
            .map_err(|e| map_err("kick", e))
    }

    async fn set_channel_visible(
        &self,
        guild: GuildId,
        channel: ChannelId,
        visible: bool,
    ) -> GatewayResult<()> {
        self.set_everyone_permission(guild, channel, Permissions::VIEW_CHANNEL, visible)
            .await
    }

    async fn set_channel_writable(
        &self,
        guild: GuildId,
        channel: ChannelId,
        writable: bool,
    ) -> GatewayResult<()> {
        self.set_everyone_permission(guild, channel, Permissions::SEND_MESSAGES, writable)
            .await
    }

    async fn set_slowmode(&self, channel: ChannelId, seconds: u16) -> GatewayResult<()> {
        let channel: sid::ChannelId = snowflake(channel.get(), "channel")?;
        channel
            .edit(self.http.as_ref(), EditChannel::new().rate_limit_per_user(seconds))
            .await
            .map(|_| ())
            .map_err(|e| map_err("set slowmode", e))
    }

    async fn create_role(&self, guild: GuildId, role: &NewRole) -> GatewayResult<RoleId> {
        let guild: sid::GuildId = snowflake(guild.get(), "guild")?;
        let builder = EditRole::new()
            .name(&role.name)
            .colour(role.color)
            .hoist(role.hoist)
            .mentionable(role.mentionable);
        let created = guild
            .create_role(self.http.as_ref(), builder)
            .await
            .map_err(|e| map_err("create role", e))?;
        Ok(RoleId(created.id.get()))
    }

    async fn delete_role(&self, guild: GuildId, role: RoleId) -> GatewayResult<()> {
        let guild: sid::GuildId = snowflake(guild.get(), "guild")?;
        let role: sid::RoleId = snowflake(role.get(), "role")?;
        guild
            .delete_role(self.http.as_ref(), role)
            .await
            .map_err(|e| map_err("delete role", e))
    }

    async fn create_text_channel(
        &self,
        guild: GuildId,
        name: &str,
        topic: Option<&str>,
    ) -> GatewayResult<ChannelId> {
        let guild: sid::GuildId = snowflake(guild.get(), "guild")?;
        let mut builder = CreateChannel::new(name).kind(ChannelType::Text);
        if let Some(topic) = topic {
            builder = builder.topic(topic);
        }
        let created = guild
            .create_channel(self.http.as_ref(), builder)
            .await
            .map_err(|e| map_err("create channel", e))?;
        Ok(ChannelId(created.id.get()))
    }

    async fn delete_channel(&self, channel: ChannelId) -> GatewayResult<()> {
        let channel: sid::ChannelId = snowflake(channel.get(), "channel")?;
        channel
            .delete(self.http.as_ref())
            .await
            .map(|_| ())
            .map_err(|e| map_err("delete channel", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ids_are_rejected() {
        let err = snowflake::<sid::UserId>(0, "user").unwrap_err();
        assert!(err.is_not_found());
        let id: sid::UserId = snowflake(42, "user").unwrap();
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn administrator_is_its_own_bit() {
        assert_eq!(
            permission_bits(Permission::Administrator),
            Permissions::ADMINISTRATOR
        );
        assert!(!permission_bits(Permission::ManageRoles).contains(Permissions::ADMINISTRATOR));
    }
}
