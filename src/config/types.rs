//! Core configuration types and loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::defaults::{default_data_dir, default_prefix, default_true};
use super::roles::RolesConfig;
use super::roster::RosterConfig;
use super::welcome::WelcomeConfig;
use crate::platform::{ChannelId, GuildId, UserId};

/// Environment variable that overrides `bot.token`.
pub const TOKEN_ENV: &str = "DISCORD_TOKEN";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bot identity and channels.
    pub bot: BotConfig,
    /// Role catalog.
    #[serde(default)]
    pub roles: RolesConfig,
    /// Roster export files.
    #[serde(default)]
    pub roster: RosterConfig,
    /// JSON store location.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Welcome prompt settings.
    #[serde(default)]
    pub welcome: WelcomeConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment overrides (currently only the bot token).
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(TOKEN_ENV)
            && !token.trim().is_empty()
        {
            self.bot.token = token.trim().to_string();
        }
    }
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Bot token. Prefer the `DISCORD_TOKEN` environment variable.
    #[serde(default)]
    pub token: String,
    /// The guild this bot manages.
    pub guild_id: GuildId,
    /// Prefix for text commands (default: "!").
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Users allowed to run admin-only commands regardless of guild permissions.
    #[serde(default)]
    pub admin_ids: Vec<UserId>,
    /// Channel where `verify` may be used.
    pub verification_channel_id: ChannelId,
    /// Channel where welcome prompts are posted.
    pub welcome_channel_id: ChannelId,
    /// Channel moderation actions are logged to.
    pub log_channel_id: Option<ChannelId>,
    /// Prometheus metrics HTTP port (0 or absent disables).
    pub metrics_port: Option<u16>,
    /// Register slash commands with the guild on startup (default: true).
    #[serde(default = "default_true")]
    pub register_slash_commands: bool,
}

impl BotConfig {
    pub fn is_admin(&self, user: UserId) -> bool {
        self.admin_ids.contains(&user)
    }
}

/// Location of the JSON stores.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the JSON files (default: "data").
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
        }
    }
}
