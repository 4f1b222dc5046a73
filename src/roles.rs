//! Role catalog: badge priority, legacy aliases, abbreviations and role ids.

use crate::config::RolesConfig;
use crate::platform::RoleId;
use std::collections::BTreeMap;

/// The set of roles the bot assigns and the badges it writes into names.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    priority: Vec<String>,
    aliases: Vec<String>,
    abbreviations: BTreeMap<String, String>,
    ids: BTreeMap<String, RoleId>,
    auto_assigned: Option<RoleId>,
    /// Lower-cased badge word sequences, longest first.
    badge_tokens: Vec<Vec<String>>,
}

impl RoleCatalog {
    pub fn new(config: &RolesConfig) -> Self {
        let mut catalog = Self {
            priority: config.priority.clone(),
            aliases: config.aliases.clone(),
            abbreviations: config.abbreviations.clone(),
            ids: config.ids.clone(),
            auto_assigned: config.auto_assigned,
            badge_tokens: Vec::new(),
        };
        catalog.badge_tokens = catalog.build_badge_tokens();
        catalog
    }

    /// Every label that may appear as a badge, split into `|`-free word runs.
    ///
    /// "CA | WoB" contributes both "ca" and "wob" so that either half is
    /// stripped wherever it appears.
    fn build_badge_tokens(&self) -> Vec<Vec<String>> {
        let labels = self
            .priority
            .iter()
            .chain(self.aliases.iter())
            .chain(self.abbreviations.values());

        let mut tokens: Vec<Vec<String>> = Vec::new();
        for label in labels {
            for part in label.split('|') {
                let words: Vec<String> = part
                    .split_whitespace()
                    .map(|w| w.to_lowercase())
                    .collect();
                if !words.is_empty() && !tokens.contains(&words) {
                    tokens.push(words);
                }
            }
        }
        tokens.sort_by(|a, b| b.len().cmp(&a.len()));
        tokens
    }

    pub fn priority(&self) -> &[String] {
        &self.priority
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn badge_tokens(&self) -> &[Vec<String>] {
        &self.badge_tokens
    }

    /// First role in priority order that the member matched.
    pub fn highest_role<'a>(&'a self, matched: &[String]) -> Option<&'a str> {
        self.priority
            .iter()
            .find(|role| matched.iter().any(|m| m == *role))
            .map(String::as_str)
    }

    pub fn abbreviation(&self, role: &str) -> Option<&str> {
        self.abbreviations.get(role).map(String::as_str)
    }

    pub fn role_id(&self, role: &str) -> Option<RoleId> {
        self.ids.get(role).copied()
    }

    pub fn auto_assigned(&self) -> Option<RoleId> {
        self.auto_assigned
    }
}
