//! Integration test common infrastructure.
//!
//! Provides a recording gateway, a recording request, and a harness that
//! wires them to a real `Session` and `Registry` over a temp store directory.

#![allow(dead_code)]

pub mod gateway;
pub mod request;

pub use gateway::{Call, FakeGateway};
pub use request::FakeRequest;

use rosterd::config::Config;
use rosterd::handlers::{CommandInput, Registry};
use rosterd::platform::{ChannelId, GuildId, RoleId, UserId};
use rosterd::roster::EmailRoleIndex;
use rosterd::state::Session;
use tempfile::TempDir;

pub const GUILD: GuildId = GuildId(100);
pub const VERIFY_CHANNEL: ChannelId = ChannelId(200);
pub const WELCOME_CHANNEL: ChannelId = ChannelId(300);
pub const LOG_CHANNEL: ChannelId = ChannelId(400);
pub const GENERAL: ChannelId = ChannelId(500);

/// Listed in `bot.admin_ids`.
pub const ADMIN: UserId = UserId(2);
pub const MODERATOR: UserId = UserId(3);
pub const MEMBER: UserId = UserId(42);

pub const AUTO_ROLE: RoleId = RoleId(9);
pub const MENTOR_ROLE: RoleId = RoleId(11);
pub const CONTRIBUTOR_ROLE: RoleId = RoleId(12);
pub const CA_ROLE: RoleId = RoleId(13);

pub fn test_config(dir: &std::path::Path) -> Config {
    let toml = format!(
        r#"
[bot]
token = "test-token"
guild_id = {guild}
admin_ids = [{admin}]
verification_channel_id = {verify}
welcome_channel_id = {welcome}
log_channel_id = {log}

[roles]
auto_assigned = {auto}

[roles.ids]
Mentor = {mentor}
Contributor = {contributor}
"Campus Ambassador" = {ca}

[storage]
dir = "{dir}"
"#,
        guild = GUILD,
        admin = ADMIN,
        verify = VERIFY_CHANNEL,
        welcome = WELCOME_CHANNEL,
        log = LOG_CHANNEL,
        auto = AUTO_ROLE,
        mentor = MENTOR_ROLE,
        contributor = CONTRIBUTOR_ROLE,
        ca = CA_ROLE,
        dir = dir.display(),
    );
    toml::from_str(&toml).expect("test config parses")
}

/// A session, fake gateway and registry sharing one temp store directory.
pub struct Harness {
    pub dir: TempDir,
    pub session: Session,
    pub gateway: FakeGateway,
    pub registry: Registry,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_roster(EmailRoleIndex::new())
    }

    pub fn with_roster(roster: EmailRoleIndex) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let session = Session::new(test_config(dir.path()), roster);
        Self {
            dir,
            session,
            gateway: FakeGateway::new(),
            registry: Registry::new(),
        }
    }

    /// Run a prefix command line (without the prefix) as `user` in `channel`.
    pub async fn run(&self, user: UserId, channel: ChannelId, line: &str) -> FakeRequest {
        let mut request = FakeRequest::new(user, GUILD, channel);
        self.dispatch(&mut request, line).await;
        request
    }

    pub async fn dispatch(&self, request: &mut FakeRequest, line: &str) {
        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
        self.registry
            .dispatch(
                &self.session,
                &self.gateway,
                request,
                name,
                CommandInput::Text(rest.to_string()),
            )
            .await;
    }
}
