//! Nickname formatting with role badges.
//!
//! A verified member's nickname is `"<base> | <badge>"`, where the base is
//! their display name with every known badge removed. The platform caps
//! nicknames at [`MAX_NICK_LEN`] characters; when the full label does not fit
//! the base is shortened and the role's abbreviation (if any) is used instead.

use crate::error::{BotError, BotResult};
use crate::roles::RoleCatalog;

/// Platform nickname limit, in characters.
pub const MAX_NICK_LEN: usize = 32;

const SEPARATOR: &str = " | ";

/// Remove every badge token from a display name.
///
/// The name is split on `|`; within each segment any run of words matching a
/// badge (case-insensitive) is dropped. Empty segments disappear and the
/// remaining segments are rejoined with `" | "`.
pub fn strip_badges(name: &str, catalog: &RoleCatalog) -> String {
    let tokens = catalog.badge_tokens();
    name.split('|')
        .map(|segment| strip_segment(segment, tokens))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

fn strip_segment(segment: &str, tokens: &[Vec<String>]) -> String {
    let words: Vec<&str> = segment.split_whitespace().collect();
    let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

    let mut kept = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        // Tokens are sorted longest first so "campus ambassador wob" wins over "ca".
        let matched = tokens.iter().find(|token| {
            lowered.len() - i >= token.len()
                && lowered[i..i + token.len()]
                    .iter()
                    .zip(token.iter())
                    .all(|(w, t)| w == t)
        });
        match matched {
            Some(token) => i += token.len(),
            None => {
                kept.push(words[i]);
                i += 1;
            }
        }
    }
    kept.join(" ")
}

/// Build the nickname for a member who matched `matched_roles`.
///
/// Fails with [`BotError::Unexpected`] when none of the roles is in the
/// catalog's priority list; callers keep the existing nickname in that case.
pub fn format_nickname(
    display_name: &str,
    matched_roles: &[String],
    catalog: &RoleCatalog,
) -> BotResult<String> {
    let role = catalog.highest_role(matched_roles).ok_or_else(|| {
        BotError::Unexpected(format!("no prioritized role among {matched_roles:?}"))
    })?;

    let base = strip_badges(display_name, catalog);
    let base = base.trim();

    let candidate = compose(base, role);
    let len = char_len(&candidate);
    if len <= MAX_NICK_LEN {
        return Ok(candidate);
    }

    let badge = catalog.abbreviation(role).unwrap_or(role);
    let base = drop_trailing(base, len - MAX_NICK_LEN);
    let candidate = compose(base, badge);
    let len = char_len(&candidate);
    if len <= MAX_NICK_LEN {
        return Ok(candidate);
    }

    let base = drop_trailing(base, len - MAX_NICK_LEN);
    Ok(truncate(&compose(base, badge), MAX_NICK_LEN))
}

fn compose(base: &str, badge: &str) -> String {
    if base.is_empty() {
        truncate(badge, MAX_NICK_LEN)
    } else {
        format!("{base}{SEPARATOR}{badge}")
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Drop `n` chars from the end, then any dangling separator or whitespace.
fn drop_trailing(s: &str, n: usize) -> &str {
    let keep = char_len(s).saturating_sub(n);
    let end = s.char_indices().nth(keep).map_or(s.len(), |(idx, _)| idx);
    trim_dangling(&s[..end])
}

fn truncate(s: &str, max: usize) -> String {
    trim_dangling(&s.chars().take(max).collect::<String>()).to_string()
}

fn trim_dangling(s: &str) -> &str {
    s.trim_end_matches(|c: char| c == '|' || c.is_whitespace())
}
