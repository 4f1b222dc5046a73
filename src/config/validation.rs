//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use super::welcome::MAX_WELCOME_SECS;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("bot.token is required (or set DISCORD_TOKEN)")]
    MissingToken,
    #[error("bot.guild_id must be non-zero")]
    MissingGuild,
    #[error("bot.{0} must be non-zero")]
    ZeroChannel(&'static str),
    #[error("bot.prefix must not be empty")]
    EmptyPrefix,
    #[error("roles.priority must list at least one role")]
    EmptyPriority,
    #[error("roles.priority lists '{0}' more than once")]
    DuplicatePriority(String),
    #[error("roles.ids maps '{0}', which is not in roles.priority")]
    UnprioritizedRole(String),
    #[error("roster track '{0}' is not in roles.priority")]
    UnknownTrackRole(String),
    #[error("roster track '{0}' lists no files")]
    EmptyTrack(String),
    #[error("roster file does not exist: {0}")]
    RosterFileNotFound(String),
    #[error("abbreviation for '{role}' is longer than {max} characters")]
    AbbreviationTooLong { role: String, max: usize },
    #[error("welcome.sweep_interval_secs must be non-zero")]
    ZeroSweepInterval,
    #[error("welcome.{field} must be at most {max} seconds")]
    WelcomeTimingTooLarge { field: &'static str, max: u64 },
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bot.token.trim().is_empty() {
        errors.push(ValidationError::MissingToken);
    }
    if config.bot.guild_id.get() == 0 {
        errors.push(ValidationError::MissingGuild);
    }
    let channels = [
        ("verification_channel_id", Some(config.bot.verification_channel_id)),
        ("welcome_channel_id", Some(config.bot.welcome_channel_id)),
        ("log_channel_id", config.bot.log_channel_id),
    ];
    for (field, channel) in channels {
        if channel.is_some_and(|c| c.get() == 0) {
            errors.push(ValidationError::ZeroChannel(field));
        }
    }
    if config.bot.prefix.is_empty() {
        errors.push(ValidationError::EmptyPrefix);
    }

    // Role catalog
    let roles = &config.roles;
    if roles.priority.is_empty() {
        errors.push(ValidationError::EmptyPriority);
    }
    for (i, role) in roles.priority.iter().enumerate() {
        if roles.priority[..i].contains(role) {
            errors.push(ValidationError::DuplicatePriority(role.clone()));
        }
    }
    for name in roles.ids.keys() {
        if !roles.priority.contains(name) {
            errors.push(ValidationError::UnprioritizedRole(name.clone()));
        }
    }
    for (role, badge) in &roles.abbreviations {
        if badge.chars().count() > crate::nickname::MAX_NICK_LEN {
            errors.push(ValidationError::AbbreviationTooLong {
                role: role.clone(),
                max: crate::nickname::MAX_NICK_LEN,
            });
        }
    }

    // Roster tracks
    for track in &config.roster.tracks {
        if !roles.priority.contains(&track.role) {
            errors.push(ValidationError::UnknownTrackRole(track.role.clone()));
        }
        if track.files.is_empty() {
            errors.push(ValidationError::EmptyTrack(track.role.clone()));
        }
        for file in &track.files {
            if !file.exists() {
                errors.push(ValidationError::RosterFileNotFound(file.display().to_string()));
            }
        }
    }

    if config.welcome.sweep_interval_secs == 0 {
        errors.push(ValidationError::ZeroSweepInterval);
    }
    let timings = [
        ("sweep_interval_secs", config.welcome.sweep_interval_secs),
        ("max_age_secs", config.welcome.max_age_secs),
    ];
    for (field, secs) in timings {
        if secs > MAX_WELCOME_SECS {
            errors.push(ValidationError::WelcomeTimingTooLarge {
                field,
                max: MAX_WELCOME_SECS,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
