//! Chat platform boundary.
//!
//! Everything the bot needs from Discord goes through the [`Gateway`] trait so
//! the verification and moderation logic can run against an in-memory fake in
//! tests. The serenity-backed implementation lives in [`discord`]; the event
//! adapters that turn gateway events into handler calls live in [`events`].

pub mod discord;
pub mod events;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

snowflake!(
    /// Platform user id.
    UserId
);
snowflake!(
    /// Guild (server) id. Also the id of the guild's @everyone role.
    GuildId
);
snowflake!(
    /// Text channel id.
    ChannelId
);
snowflake!(
    /// Message id.
    MessageId
);
snowflake!(
    /// Role id.
    RoleId
);

impl GuildId {
    /// The @everyone role shares the guild's id.
    pub fn everyone_role(self) -> RoleId {
        RoleId(self.0)
    }
}

impl UserId {
    pub fn mention(self) -> String {
        format!("<@{}>", self.0)
    }
}

impl ChannelId {
    pub fn mention(self) -> String {
        format!("<#{}>", self.0)
    }
}

impl RoleId {
    pub fn mention(self) -> String {
        format!("<@&{}>", self.0)
    }
}

/// Errors returned by remote platform calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The target (member, message, ban entry) does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The bot lacks the platform permission for this call.
    #[error("missing permission: {0}")]
    PermissionDenied(String),
    #[error("platform error: {0}")]
    Other(String),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Snapshot of a guild member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub user_id: UserId,
    /// Account name (not the guild nickname).
    pub username: String,
    /// Guild nickname if set, else global display name, else username.
    pub display_name: String,
    /// Roles held, excluding @everyone.
    pub roles: Vec<RoleId>,
    pub is_bot: bool,
}

impl MemberInfo {
    pub fn has_role(&self, role: RoleId) -> bool {
        self.roles.contains(&role)
    }
}

/// Guild permissions the command layer gates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Administrator,
    ModerateMembers,
    ManageChannels,
    ManageMessages,
    ManageRoles,
    BanMembers,
    KickMembers,
}

impl Permission {
    pub fn name(self) -> &'static str {
        match self {
            Self::Administrator => "Administrator",
            Self::ModerateMembers => "Moderate Members",
            Self::ManageChannels => "Manage Channels",
            Self::ManageMessages => "Manage Messages",
            Self::ManageRoles => "Manage Roles",
            Self::BanMembers => "Ban Members",
            Self::KickMembers => "Kick Members",
        }
    }
}

/// Options for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    pub name: String,
    /// 24-bit RGB color.
    pub color: u32,
    pub hoist: bool,
    pub mentionable: bool,
}

/// Remote operations on the chat platform.
///
/// Every call is fallible and is not retried by callers.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn member(&self, guild: GuildId, user: UserId) -> GatewayResult<MemberInfo>;
    async fn members(&self, guild: GuildId) -> GatewayResult<Vec<MemberInfo>>;
    async fn guild_owner(&self, guild: GuildId) -> GatewayResult<UserId>;
    async fn has_permission(
        &self,
        guild: GuildId,
        user: UserId,
        permission: Permission,
    ) -> GatewayResult<bool>;

    async fn add_role(&self, guild: GuildId, user: UserId, role: RoleId) -> GatewayResult<()>;
    async fn remove_role(&self, guild: GuildId, user: UserId, role: RoleId) -> GatewayResult<()>;
    async fn set_nickname(&self, guild: GuildId, user: UserId, nick: &str) -> GatewayResult<()>;

    async fn send_message(&self, channel: ChannelId, content: &str) -> GatewayResult<MessageId>;
    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> GatewayResult<()>;
    async fn send_direct(&self, user: UserId, content: &str) -> GatewayResult<()>;
    /// Delete up to `limit` recent messages, returning how many were removed.
    async fn purge(&self, channel: ChannelId, limit: u64) -> GatewayResult<usize>;

    async fn timeout(
        &self,
        guild: GuildId,
        user: UserId,
        until: DateTime<Utc>,
        reason: &str,
    ) -> GatewayResult<()>;
    async fn ban(&self, guild: GuildId, user: UserId, reason: &str) -> GatewayResult<()>;
    async fn unban(&self, guild: GuildId, user: UserId) -> GatewayResult<()>;
    async fn kick(&self, guild: GuildId, user: UserId, reason: &str) -> GatewayResult<()>;

    /// Allow or deny @everyone viewing the channel.
    async fn set_channel_visible(
        &self,
        guild: GuildId,
        channel: ChannelId,
        visible: bool,
    ) -> GatewayResult<()>;
    /// Allow or deny @everyone sending in the channel.
    async fn set_channel_writable(
        &self,
        guild: GuildId,
        channel: ChannelId,
        writable: bool,
    ) -> GatewayResult<()>;
    async fn set_slowmode(&self, channel: ChannelId, seconds: u16) -> GatewayResult<()>;

    async fn create_role(&self, guild: GuildId, role: &NewRole) -> GatewayResult<RoleId>;
    async fn delete_role(&self, guild: GuildId, role: RoleId) -> GatewayResult<()>;
    async fn create_text_channel(
        &self,
        guild: GuildId,
        name: &str,
        topic: Option<&str>,
    ) -> GatewayResult<ChannelId>;
    async fn delete_channel(&self, channel: ChannelId) -> GatewayResult<()>;
}
