//! Warning book: per-(guild, member) warning buckets.
//!
//! A bucket moves from clean to `Warned(n)` as warnings are added. Only the
//! warning that makes the count exactly [`ESCALATION_THRESHOLD`] asks the
//! caller to escalate; later warnings do not repeat the timeout.

use super::persistence::{JsonStore, StoreError};
use super::records::{WarningBucket, WarningRecord};
use crate::error::{BotError, BotResult};
use crate::platform::{GuildId, UserId};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Warning count that triggers the automatic timeout.
pub const ESCALATION_THRESHOLD: u32 = 3;

/// Length of the automatic timeout.
pub fn auto_timeout() -> chrono::Duration {
    chrono::Duration::hours(1)
}

type Book = BTreeMap<GuildId, BTreeMap<UserId, WarningBucket>>;

/// Result of adding a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningOutcome {
    pub count: u32,
    pub escalate: bool,
}

pub struct WarningBook {
    book: Mutex<Book>,
    store: JsonStore<Book>,
}

impl WarningBook {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = JsonStore::new(path);
        let book = Mutex::new(store.load());
        Self { book, store }
    }

    pub fn add_warning(
        &self,
        guild: GuildId,
        user: UserId,
        reason: &str,
        moderator: UserId,
        now: DateTime<Utc>,
    ) -> Result<WarningOutcome, StoreError> {
        let mut book = self.book.lock();
        let bucket = book.entry(guild).or_default().entry(user).or_default();
        bucket.warnings.push(WarningRecord {
            reason: reason.to_string(),
            moderator,
            timestamp: now,
        });
        bucket.count += 1;
        let outcome = WarningOutcome {
            count: bucket.count,
            escalate: bucket.count == ESCALATION_THRESHOLD,
        };
        self.store.save(&book)?;
        Ok(outcome)
    }

    /// Snapshot of a member's bucket. `None` when they have no warnings.
    pub fn get(&self, guild: GuildId, user: UserId) -> Option<WarningBucket> {
        self.book
            .lock()
            .get(&guild)
            .and_then(|users| users.get(&user))
            .filter(|bucket| bucket.count > 0)
            .cloned()
    }

    /// Reset a member to zero warnings, returning how many were cleared.
    pub fn clear_all(&self, guild: GuildId, user: UserId) -> BotResult<u32> {
        let mut book = self.book.lock();
        let bucket = active_bucket(&mut book, guild, user)?;
        let cleared = bucket.count;
        *bucket = WarningBucket::default();
        self.store.save(&book)?;
        Ok(cleared)
    }

    /// Remove the `index`-th (1-based) warning.
    pub fn clear_one(&self, guild: GuildId, user: UserId, index: usize) -> BotResult<WarningRecord> {
        let mut book = self.book.lock();
        let bucket = active_bucket(&mut book, guild, user)?;
        if index == 0 || index > bucket.warnings.len() {
            return Err(BotError::Validation(format!(
                "Invalid warning index. User has {} warnings.",
                bucket.warnings.len()
            )));
        }
        let removed = bucket.warnings.remove(index - 1);
        bucket.count = bucket.count.saturating_sub(1);
        self.store.save(&book)?;
        Ok(removed)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.store.save(&self.book.lock())
    }
}

fn active_bucket(book: &mut Book, guild: GuildId, user: UserId) -> BotResult<&mut WarningBucket> {
    book.get_mut(&guild)
        .and_then(|users| users.get_mut(&user))
        .filter(|bucket| bucket.count > 0)
        .ok_or_else(|| BotError::NotFound(format!("{} has no warnings.", user.mention())))
}
