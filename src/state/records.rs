//! Persisted record types.

use crate::platform::{MessageId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One successful verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub username: String,
    pub user_id: UserId,
    pub email: String,
    pub roles: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// A nickname the bot rewrote during verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernameChange {
    pub username: String,
    pub user_id: UserId,
    pub email: String,
    pub old_name: String,
    pub new_name: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningRecord {
    pub reason: String,
    pub moderator: UserId,
    pub timestamp: DateTime<Utc>,
}

/// All warnings for one member of one guild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningBucket {
    pub count: u32,
    pub warnings: Vec<WarningRecord>,
}

impl WarningBucket {
    /// The most recent `n` records, oldest first.
    pub fn recent(&self, n: usize) -> &[WarningRecord] {
        let start = self.warnings.len().saturating_sub(n);
        &self.warnings[start..]
    }
}

/// Welcome message posted for a member who has not verified yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomePrompt {
    pub message_id: MessageId,
    pub created_at: DateTime<Utc>,
}
