//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, BotConfig, StorageConfig)
//! - [`roles`]: Role catalog configuration (priority, aliases, abbreviations, ids)
//! - [`roster`]: Roster export files per role track
//! - [`welcome`]: Welcome prompt template and expiry timings
//! - [`validation`]: Startup checks that report every problem at once

mod defaults;
mod roles;
mod roster;
mod types;
mod welcome;
pub mod validation;

pub use roles::RolesConfig;
pub use roster::{RosterConfig, RosterTrack};
pub use types::{BotConfig, Config, ConfigError, StorageConfig};
pub use welcome::WelcomeConfig;
