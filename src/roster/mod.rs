//! Roster lookup.
//!
//! The roster is the external source of truth mapping emails to role tracks.
//! It is loaded once at startup (see [`source`]) and read-only afterwards.

pub mod source;

use std::collections::HashSet;

/// Normalize an email for comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Role name → set of lower-cased emails, in track order.
#[derive(Debug, Clone, Default)]
pub struct EmailRoleIndex {
    buckets: Vec<(String, HashSet<String>)>,
}

impl EmailRoleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add emails to a role bucket, creating it on first use.
    pub fn extend<I, S>(&mut self, role: &str, emails: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let idx = match self.buckets.iter().position(|(name, _)| name == role) {
            Some(idx) => idx,
            None => {
                self.buckets.push((role.to_string(), HashSet::new()));
                self.buckets.len() - 1
            }
        };
        let bucket = &mut self.buckets[idx].1;
        for email in emails {
            let email = normalize_email(email.as_ref());
            if !email.is_empty() {
                bucket.insert(email);
            }
        }
    }

    /// All roles whose bucket contains `email`. Empty means "not found".
    pub fn roles_for_email(&self, email: &str) -> Vec<String> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Vec::new();
        }
        self.buckets
            .iter()
            .filter(|(_, emails)| emails.contains(&email))
            .map(|(role, _)| role.clone())
            .collect()
    }

    pub fn roles(&self) -> impl Iterator<Item = (&str, usize)> {
        self.buckets
            .iter()
            .map(|(role, emails)| (role.as_str(), emails.len()))
    }

    pub fn total_emails(&self) -> usize {
        self.buckets.iter().map(|(_, emails)| emails.len()).sum()
    }
}
