//! Bot session: everything handlers share.
//!
//! The session is constructed once after the roster has loaded and is passed
//! to every handler and background task behind an `Arc`. Each structure has
//! its own lock; none of them is held across an `.await`.

use super::persistence::{
    AppendLog, FAILED_ATTEMPTS_FILE, JsonStore, StoreError, USERNAME_UPDATES_FILE,
    VERIFICATION_LOG_FILE, WARNINGS_FILE, WELCOME_MESSAGES_FILE,
};
use super::records::{UsernameChange, VerificationRecord};
use super::warnings::WarningBook;
use super::welcome::WelcomePrompts;
use crate::config::Config;
use crate::platform::{GuildId, UserId};
use crate::roles::RoleCatalog;
use crate::roster::EmailRoleIndex;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::info;

type FailedAttempts = BTreeMap<UserId, String>;

pub struct Session {
    pub config: Config,
    pub catalog: RoleCatalog,
    pub roster: EmailRoleIndex,
    pub welcome: WelcomePrompts,
    pub warnings: WarningBook,
    pub verifications: AppendLog<VerificationRecord>,
    pub username_changes: AppendLog<UsernameChange>,
    failed_attempts: Mutex<FailedAttempts>,
    failed_store: JsonStore<FailedAttempts>,
    /// Members found by `cacheunverified`, per guild. Not persisted.
    unverified: DashMap<GuildId, Vec<UserId>>,
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Open every store under `config.storage.dir`.
    pub fn new(config: Config, roster: EmailRoleIndex) -> Self {
        let dir = config.storage.dir.clone();
        let catalog = RoleCatalog::new(&config.roles);
        let failed_store = JsonStore::new(dir.join(FAILED_ATTEMPTS_FILE));
        let failed_attempts = Mutex::new(failed_store.load());

        let session = Self {
            catalog,
            roster,
            welcome: WelcomePrompts::open(dir.join(WELCOME_MESSAGES_FILE)),
            warnings: WarningBook::open(dir.join(WARNINGS_FILE)),
            verifications: AppendLog::open(dir.join(VERIFICATION_LOG_FILE)),
            username_changes: AppendLog::open(dir.join(USERNAME_UPDATES_FILE)),
            failed_attempts,
            failed_store,
            unverified: DashMap::new(),
            started_at: Utc::now(),
            config,
        };
        info!(
            dir = %dir.display(),
            pending_prompts = session.welcome.len(),
            verifications = session.verifications.len(),
            roster_emails = session.roster.total_emails(),
            "Session opened"
        );
        session
    }

    /// Remember the last unmatched email for a member, overwriting earlier ones.
    pub fn record_failed_attempt(&self, user: UserId, email: &str) -> Result<(), StoreError> {
        let mut attempts = self.failed_attempts.lock();
        attempts.insert(user, email.to_string());
        self.failed_store.save(&attempts)
    }

    pub fn failed_attempt(&self, user: UserId) -> Option<String> {
        self.failed_attempts.lock().get(&user).cloned()
    }

    pub fn cache_unverified(&self, guild: GuildId, members: Vec<UserId>) {
        self.unverified.insert(guild, members);
    }

    pub fn unverified(&self, guild: GuildId) -> Vec<UserId> {
        self.unverified
            .get(&guild)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Rewrite every mirror. Called once more at shutdown.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.welcome.flush()?;
        self.warnings.flush()?;
        self.verifications.flush()?;
        self.username_changes.flush()?;
        self.failed_store.save(&self.failed_attempts.lock())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &std::path::Path) -> Config {
        let toml = format!(
            r#"
[bot]
guild_id = 1
verification_channel_id = 2
welcome_channel_id = 3

[storage]
dir = "{}"
"#,
            dir.display()
        );
        toml::from_str(&toml).unwrap()
    }

    #[test]
    fn failed_attempts_overwrite_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(config(dir.path()), EmailRoleIndex::new());
        session.record_failed_attempt(UserId(7), "a@x.org").unwrap();
        session.record_failed_attempt(UserId(7), "b@x.org").unwrap();
        assert_eq!(session.failed_attempt(UserId(7)).as_deref(), Some("b@x.org"));

        let json = std::fs::read_to_string(dir.path().join(FAILED_ATTEMPTS_FILE)).unwrap();
        assert!(json.contains("b@x.org"));
        assert!(!json.contains("a@x.org"));
    }

    #[test]
    fn flush_writes_every_store() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(config(dir.path()), EmailRoleIndex::new());
        session.flush().unwrap();
        for file in [
            FAILED_ATTEMPTS_FILE,
            VERIFICATION_LOG_FILE,
            WELCOME_MESSAGES_FILE,
            USERNAME_UPDATES_FILE,
            WARNINGS_FILE,
        ] {
            assert!(dir.path().join(file).exists(), "{file}");
        }
    }

    #[test]
    fn unverified_cache_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(config(dir.path()), EmailRoleIndex::new());
        assert!(session.unverified(GuildId(1)).is_empty());
        session.cache_unverified(GuildId(1), vec![UserId(1), UserId(2)]);
        session.cache_unverified(GuildId(1), vec![UserId(3)]);
        assert_eq!(session.unverified(GuildId(1)), vec![UserId(3)]);
    }
}
