//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Bot Defaults
// =============================================================================

pub fn default_prefix() -> String {
    "!".to_string()
}

pub fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

// =============================================================================
// Role Catalog Defaults
// =============================================================================

pub fn default_priority() -> Vec<String> {
    [
        "Project Admin Wob",
        "Project Admin",
        "Mentor Wob",
        "Mentor",
        "Campus Ambassador Wob",
        "Campus Ambassador",
        "Contributor Wob",
        "Contributor",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn default_aliases() -> Vec<String> {
    [
        "project admin",
        "mentor",
        "campus ambassador",
        "contributor",
        "contributer",
        "pa",
        "ca",
        "contri",
        "CA",
        "PA",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn default_abbreviations() -> BTreeMap<String, String> {
    [
        ("Campus Ambassador", "CA"),
        ("Campus Ambassador Wob", "CA | WoB"),
        ("Contributor Wob", "Contri | WoB"),
        ("Mentor Wob", "Mentor | WoB"),
        ("Project Admin Wob", "PA | WoB"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

// =============================================================================
// Roster Defaults
// =============================================================================

pub fn default_email_column() -> String {
    "email".to_string()
}

// =============================================================================
// Welcome Defaults
// =============================================================================

pub fn default_sweep_interval() -> u64 {
    30 * 60
}

pub fn default_max_age() -> u64 {
    60 * 60
}

pub fn default_welcome_message() -> String {
    "Welcome to the server, {mention}! To get access, please verify your selection \
     by using the command `/verify registered-email-id`"
        .to_string()
}
