//! Tracked welcome prompts, mirrored to `welcome_messages.json`.

use super::persistence::{JsonStore, StoreError};
use super::records::WelcomePrompt;
use crate::platform::{MessageId, UserId};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;

type Prompts = BTreeMap<UserId, WelcomePrompt>;

pub struct WelcomePrompts {
    prompts: Mutex<Prompts>,
    store: JsonStore<Prompts>,
}

impl WelcomePrompts {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = JsonStore::new(path);
        let prompts = Mutex::new(store.load());
        Self { prompts, store }
    }

    /// Record a prompt, replacing any earlier one for the same member.
    pub fn track(&self, user: UserId, prompt: WelcomePrompt) -> Result<(), StoreError> {
        let mut prompts = self.prompts.lock();
        prompts.insert(user, prompt);
        self.store.save(&prompts)
    }

    pub fn get(&self, user: UserId) -> Option<WelcomePrompt> {
        self.prompts.lock().get(&user).copied()
    }

    pub fn remove(&self, user: UserId) -> Result<Option<WelcomePrompt>, StoreError> {
        let mut prompts = self.prompts.lock();
        let removed = prompts.remove(&user);
        if removed.is_some() {
            self.store.save(&prompts)?;
        }
        Ok(removed)
    }

    /// Prompts strictly older than `max_age` at `now`.
    pub fn stale(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> Vec<(UserId, WelcomePrompt)> {
        self.prompts
            .lock()
            .iter()
            .filter(|(_, prompt)| now - prompt.created_at > max_age)
            .map(|(user, prompt)| (*user, *prompt))
            .collect()
    }

    /// Drop entries that still point at the given messages.
    ///
    /// An entry replaced since it was selected (the member re-joined) is kept.
    /// The mirror is rewritten only when something was removed.
    pub fn remove_expired(&self, expired: &[(UserId, MessageId)]) -> Result<usize, StoreError> {
        let mut prompts = self.prompts.lock();
        let mut removed = 0;
        for (user, message_id) in expired {
            if prompts.get(user).is_some_and(|p| p.message_id == *message_id) {
                prompts.remove(user);
                removed += 1;
            }
        }
        if removed > 0 {
            self.store.save(&prompts)?;
        }
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.store.save(&self.prompts.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn prompt(id: u64, created_at: DateTime<Utc>) -> WelcomePrompt {
        WelcomePrompt {
            message_id: MessageId(id),
            created_at,
        }
    }

    #[test]
    fn stale_uses_strict_age() {
        let dir = tempfile::tempdir().unwrap();
        let prompts = WelcomePrompts::open(dir.path().join("w.json"));
        let t = Utc::now();
        prompts.track(UserId(1), prompt(10, t)).unwrap();

        assert!(prompts.stale(t + Duration::minutes(30), Duration::hours(1)).is_empty());
        assert!(prompts.stale(t + Duration::hours(1), Duration::hours(1)).is_empty());
        assert_eq!(prompts.stale(t + Duration::minutes(90), Duration::hours(1)).len(), 1);
    }

    #[test]
    fn remove_expired_skips_replaced_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let prompts = WelcomePrompts::open(dir.path().join("w.json"));
        let t = Utc::now();
        prompts.track(UserId(1), prompt(10, t)).unwrap();
        prompts.track(UserId(1), prompt(11, t)).unwrap();

        assert_eq!(prompts.remove_expired(&[(UserId(1), MessageId(10))]).unwrap(), 0);
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts.remove_expired(&[(UserId(1), MessageId(11))]).unwrap(), 1);
        assert!(prompts.is_empty());
    }

    #[test]
    fn mirror_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.json");
        let t = Utc::now();
        WelcomePrompts::open(&path).track(UserId(5), prompt(50, t)).unwrap();
        let reopened = WelcomePrompts::open(&path);
        assert_eq!(reopened.get(UserId(5)).map(|p| p.message_id), Some(MessageId(50)));
    }
}
