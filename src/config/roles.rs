//! Role catalog configuration.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::defaults::{default_abbreviations, default_aliases, default_priority};
use crate::platform::RoleId;

/// Role catalog configuration.
///
/// `priority` decides which badge a member with several roles gets.
/// `aliases` are legacy spellings that are only ever stripped from names.
#[derive(Debug, Clone, Deserialize)]
pub struct RolesConfig {
    /// Role granted on join and removed after verification.
    pub auto_assigned: Option<RoleId>,
    /// Role names, highest privilege first.
    #[serde(default = "default_priority")]
    pub priority: Vec<String>,
    /// Lower/legacy badge spellings stripped from display names.
    #[serde(default = "default_aliases")]
    pub aliases: Vec<String>,
    /// Short badges used when the full label would overflow the nickname.
    #[serde(default = "default_abbreviations")]
    pub abbreviations: BTreeMap<String, String>,
    /// Platform role id for each role name.
    #[serde(default)]
    pub ids: BTreeMap<String, RoleId>,
}

impl Default for RolesConfig {
    fn default() -> Self {
        Self {
            auto_assigned: None,
            priority: default_priority(),
            aliases: default_aliases(),
            abbreviations: default_abbreviations(),
            ids: BTreeMap::new(),
        }
    }
}
