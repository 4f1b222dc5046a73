//! Roster export configuration.

use serde::Deserialize;
use std::path::PathBuf;

use super::defaults::default_email_column;

/// Roster sources, one track per role.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    /// Header of the column holding emails (default: "email").
    #[serde(default = "default_email_column")]
    pub email_column: String,
    /// Tracks in lookup order.
    #[serde(default)]
    pub tracks: Vec<RosterTrack>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            email_column: default_email_column(),
            tracks: Vec::new(),
        }
    }
}

/// One role track. Several exports may feed the same role.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterTrack {
    pub role: String,
    pub files: Vec<PathBuf>,
}
