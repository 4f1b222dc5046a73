//! Welcome prompt configuration.

use serde::Deserialize;
use std::time::Duration;

use super::defaults::{default_max_age, default_sweep_interval, default_welcome_message};

/// Upper bound for both welcome timings: one year.
pub const MAX_WELCOME_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct WelcomeConfig {
    /// Seconds between expiry sweeps (default: 1800).
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Prompts older than this many seconds are deleted (default: 3600).
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
    /// Prompt text; `{mention}` is replaced with the member mention.
    #[serde(default = "default_welcome_message")]
    pub message: String,
}

impl WelcomeConfig {
    /// Clamped to [`MAX_WELCOME_SECS`]; validation rejects larger values.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.min(MAX_WELCOME_SECS))
    }

    /// Clamped to [`MAX_WELCOME_SECS`]; validation rejects larger values.
    pub fn max_age(&self) -> chrono::Duration {
        let secs = i64::try_from(self.max_age_secs.min(MAX_WELCOME_SECS)).unwrap_or(i64::MAX);
        chrono::Duration::try_seconds(secs).unwrap_or_else(|| chrono::Duration::days(365))
    }

    pub fn render(&self, mention: &str) -> String {
        self.message.replace("{mention}", mention)
    }
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            max_age_secs: default_max_age(),
            message: default_welcome_message(),
        }
    }
}
