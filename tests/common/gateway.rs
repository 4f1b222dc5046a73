//! In-memory gateway that records every call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rosterd::platform::{
    ChannelId, Gateway, GatewayError, GatewayResult, GuildId, MemberInfo, MessageId, NewRole,
    Permission, RoleId, UserId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A recorded remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AddRole(UserId, RoleId),
    RemoveRole(UserId, RoleId),
    SetNickname(UserId, String),
    Send(ChannelId, String),
    Delete(ChannelId, MessageId),
    Direct(UserId, String),
    Purge(ChannelId, u64),
    Timeout(UserId, DateTime<Utc>),
    Ban(UserId, String),
    Unban(UserId),
    Kick(UserId, String),
    Visible(ChannelId, bool),
    Writable(ChannelId, bool),
    Slowmode(ChannelId, u16),
    CreateRole(NewRole),
    DeleteRole(RoleId),
    CreateChannel(String, Option<String>),
    DeleteChannel(ChannelId),
}

pub struct FakeGateway {
    calls: Mutex<Vec<Call>>,
    members: Mutex<HashMap<UserId, MemberInfo>>,
    permissions: Mutex<HashMap<UserId, Vec<Permission>>>,
    /// Operation name -> error to return instead of succeeding.
    failures: Mutex<HashMap<&'static str, GatewayError>>,
    owner: UserId,
    next_id: AtomicU64,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            members: Mutex::new(HashMap::new()),
            permissions: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            owner: UserId(1),
            next_id: AtomicU64::new(5000),
        }
    }

    pub fn add_member(&self, user: UserId, display_name: &str, roles: &[RoleId]) {
        self.members.lock().insert(
            user,
            MemberInfo {
                user_id: user,
                username: format!("user{user}"),
                display_name: display_name.to_string(),
                roles: roles.to_vec(),
                is_bot: false,
            },
        );
    }

    pub fn grant(&self, user: UserId, permission: Permission) {
        self.permissions.lock().entry(user).or_default().push(permission);
    }

    /// Make every later call of `op` fail with `error`.
    pub fn fail(&self, op: &'static str, error: GatewayError) {
        self.failures.lock().insert(op, error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Messages posted to `channel`, in order.
    pub fn sent_to(&self, channel: ChannelId) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Send(c, content) if *c == channel => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn timeouts(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::Timeout(..)))
            .count()
    }

    fn check(&self, op: &'static str) -> GatewayResult<()> {
        match self.failures.lock().get(op) {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn record(&self, op: &'static str, call: Call) -> GatewayResult<()> {
        self.check(op)?;
        self.calls.lock().push(call);
        Ok(())
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn member(&self, _guild: GuildId, user: UserId) -> GatewayResult<MemberInfo> {
        self.check("member")?;
        self.members
            .lock()
            .get(&user)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("member {user}")))
    }

    async fn members(&self, _guild: GuildId) -> GatewayResult<Vec<MemberInfo>> {
        self.check("members")?;
        let mut all: Vec<_> = self.members.lock().values().cloned().collect();
        all.sort_by_key(|m| m.user_id);
        Ok(all)
    }

    async fn guild_owner(&self, _guild: GuildId) -> GatewayResult<UserId> {
        self.check("guild_owner")?;
        Ok(self.owner)
    }

    async fn has_permission(
        &self,
        _guild: GuildId,
        user: UserId,
        permission: Permission,
    ) -> GatewayResult<bool> {
        self.check("has_permission")?;
        Ok(self.permissions.lock().get(&user).is_some_and(|granted| {
            granted.contains(&permission) || granted.contains(&Permission::Administrator)
        }))
    }

    async fn add_role(&self, _guild: GuildId, user: UserId, role: RoleId) -> GatewayResult<()> {
        self.record("add_role", Call::AddRole(user, role))
    }

    async fn remove_role(&self, _guild: GuildId, user: UserId, role: RoleId) -> GatewayResult<()> {
        self.record("remove_role", Call::RemoveRole(user, role))
    }

    async fn set_nickname(&self, _guild: GuildId, user: UserId, nick: &str) -> GatewayResult<()> {
        self.record("set_nickname", Call::SetNickname(user, nick.to_string()))
    }

    async fn send_message(&self, channel: ChannelId, content: &str) -> GatewayResult<MessageId> {
        self.record("send_message", Call::Send(channel, content.to_string()))?;
        Ok(MessageId(self.next_id()))
    }

    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> GatewayResult<()> {
        self.record("delete_message", Call::Delete(channel, message))
    }

    async fn send_direct(&self, user: UserId, content: &str) -> GatewayResult<()> {
        self.record("send_direct", Call::Direct(user, content.to_string()))
    }

    async fn purge(&self, channel: ChannelId, limit: u64) -> GatewayResult<usize> {
        self.record("purge", Call::Purge(channel, limit))?;
        Ok(limit as usize)
    }

    async fn timeout(
        &self,
        _guild: GuildId,
        user: UserId,
        until: DateTime<Utc>,
        _reason: &str,
    ) -> GatewayResult<()> {
        self.record("timeout", Call::Timeout(user, until))
    }

    async fn ban(&self, _guild: GuildId, user: UserId, reason: &str) -> GatewayResult<()> {
        self.record("ban", Call::Ban(user, reason.to_string()))
    }

    async fn unban(&self, _guild: GuildId, user: UserId) -> GatewayResult<()> {
        self.record("unban", Call::Unban(user))
    }

    async fn kick(&self, _guild: GuildId, user: UserId, reason: &str) -> GatewayResult<()> {
        self.record("kick", Call::Kick(user, reason.to_string()))
    }

    async fn set_channel_visible(
        &self,
        _guild: GuildId,
        channel: ChannelId,
        visible: bool,
    ) -> GatewayResult<()> {
        self.record("set_channel_visible", Call::Visible(channel, visible))
    }

    async fn set_channel_writable(
        &self,
        _guild: GuildId,
        channel: ChannelId,
        writable: bool,
    ) -> GatewayResult<()> {
        self.record("set_channel_writable", Call::Writable(channel, writable))
    }

    async fn set_slowmode(&self, channel: ChannelId, seconds: u16) -> GatewayResult<()> {
        self.record("set_slowmode", Call::Slowmode(channel, seconds))
    }

    async fn create_role(&self, _guild: GuildId, role: &NewRole) -> GatewayResult<RoleId> {
        self.record("create_role", Call::CreateRole(role.clone()))?;
        Ok(RoleId(self.next_id()))
    }

    async fn delete_role(&self, _guild: GuildId, role: RoleId) -> GatewayResult<()> {
        self.record("delete_role", Call::DeleteRole(role))
    }

    async fn create_text_channel(
        &self,
        _guild: GuildId,
        name: &str,
        topic: Option<&str>,
    ) -> GatewayResult<ChannelId> {
        self.record(
            "create_text_channel",
            Call::CreateChannel(name.to_string(), topic.map(str::to_string)),
        )?;
        Ok(ChannelId(self.next_id()))
    }

    async fn delete_channel(&self, channel: ChannelId) -> GatewayResult<()> {
        self.record("delete_channel", Call::DeleteChannel(channel))
    }
}
