//! Member verification against the roster.
//!
//! Both `verify` and `adminverify` end up here. The outcome carries enough
//! detail for the handler to word its reply; every remote failure after the
//! roles have been granted is logged and reported, never fatal.

use crate::error::BotResult;
use crate::nickname::format_nickname;
use crate::platform::{Gateway, GatewayError, GuildId, MemberInfo, UserId};
use crate::state::{Session, UsernameChange, VerificationRecord};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The email matched no roster track. The attempt was recorded.
    NotInRoster,
    /// Roster tracks matched but none maps to a platform role.
    Unmappable(Vec<String>),
    Verified(Verification),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub member: MemberInfo,
    /// Matched role names, in roster track order.
    pub roles: Vec<String>,
    pub nickname: NicknameChange,
}

impl Verification {
    /// Whether any granted role belongs to the Winter of Blockchain program.
    pub fn is_wob(&self) -> bool {
        self.roles.iter().any(|role| role.to_lowercase().contains("wob"))
    }

    pub fn role_list(&self) -> String {
        self.roles.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NicknameChange {
    Renamed { old: String, new: String, badge: String },
    /// The guild owner cannot be renamed by bots.
    SkippedOwner,
    /// The platform refused the rename.
    Denied,
    /// No prioritized role, or the rename failed for another reason.
    Failed,
}

/// Verify `user` against the roster using `email`.
pub async fn verify_member(
    session: &Session,
    gateway: &dyn Gateway,
    guild: GuildId,
    user: UserId,
    email: &str,
    now: DateTime<Utc>,
) -> BotResult<VerifyOutcome> {
    let email = email.trim();
    let roles = session.roster.roles_for_email(email);
    if roles.is_empty() {
        session.record_failed_attempt(user, email)?;
        crate::metrics::record_verification("not_in_roster");
        info!(user = %user, "Verification email not in roster");
        return Ok(VerifyOutcome::NotInRoster);
    }

    let role_ids: Vec<_> = roles
        .iter()
        .filter_map(|name| session.catalog.role_id(name))
        .collect();
    if role_ids.is_empty() {
        crate::metrics::record_verification("unmappable");
        warn!(user = %user, roles = ?roles, "Matched roles have no configured role ids");
        return Ok(VerifyOutcome::Unmappable(roles));
    }

    let member = gateway.member(guild, user).await?;
    for role in &role_ids {
        gateway.add_role(guild, user, *role).await?;
    }
    if let Some(auto) = session.catalog.auto_assigned()
        && member.has_role(auto)
    {
        gateway.remove_role(guild, user, auto).await?;
        debug!(user = %user, "Removed auto-assigned role");
    }

    let nickname = rename(session, gateway, guild, &member, &roles, email, now).await;

    let tracked_prompt = session.welcome.get(user);
    if let Some(prompt) = tracked_prompt {
        let channel = session.config.bot.welcome_channel_id;
        match gateway.delete_message(channel, prompt.message_id).await {
            Ok(()) => {}
            Err(GatewayError::NotFound(_)) => {
                debug!(user = %user, message = %prompt.message_id, "Welcome prompt already gone");
            }
            Err(e) => {
                // Keep the entry; the sweeper retries the delete.
                warn!(user = %user, error = %e, "Failed to delete welcome prompt");
                return finish(session, member, roles, email, nickname, now, false);
            }
        }
        if let Err(e) = session.welcome.remove(user) {
            // Roles are already granted; the record is still written.
            error!(user = %user, error = %e, "Failed to persist welcome prompt removal");
            return finish(session, member, roles, email, nickname, now, false);
        }
        crate::metrics::set_pending_prompts(session.welcome.len());
    }

    finish(session, member, roles, email, nickname, now, true)
}

fn finish(
    session: &Session,
    member: MemberInfo,
    roles: Vec<String>,
    email: &str,
    nickname: NicknameChange,
    now: DateTime<Utc>,
    prompt_cleared: bool,
) -> BotResult<VerifyOutcome> {
    session.verifications.append(VerificationRecord {
        username: member.username.clone(),
        user_id: member.user_id,
        email: email.to_string(),
        roles: roles.clone(),
        timestamp: now,
    })?;
    crate::metrics::record_verification("verified");
    info!(
        user = %member.user_id,
        roles = %roles.join(", "),
        prompt_cleared,
        "Member verified"
    );
    Ok(VerifyOutcome::Verified(Verification {
        member,
        roles,
        nickname,
    }))
}

async fn rename(
    session: &Session,
    gateway: &dyn Gateway,
    guild: GuildId,
    member: &MemberInfo,
    roles: &[String],
    email: &str,
    now: DateTime<Utc>,
) -> NicknameChange {
    let new = match format_nickname(&member.display_name, roles, &session.catalog) {
        Ok(nick) => nick,
        Err(e) => {
            error!(user = %member.user_id, error = %e, "Cannot compose nickname");
            return NicknameChange::Failed;
        }
    };
    let badge = session
        .catalog
        .highest_role(roles)
        .unwrap_or_default()
        .to_string();

    match gateway.guild_owner(guild).await {
        Ok(owner) if owner == member.user_id => return NicknameChange::SkippedOwner,
        Ok(_) => {}
        Err(e) => {
            warn!(error = %e, "Failed to look up guild owner");
            return NicknameChange::Failed;
        }
    }

    match gateway.set_nickname(guild, member.user_id, &new).await {
        Ok(()) => {
            info!(user = %member.user_id, old = %member.display_name, new = %new, "Nickname updated");
            let change = UsernameChange {
                username: member.username.clone(),
                user_id: member.user_id,
                email: email.to_string(),
                old_name: member.display_name.clone(),
                new_name: new.clone(),
                timestamp: now,
            };
            if let Err(e) = session.username_changes.append(change) {
                error!(error = %e, "Failed to record nickname change");
            }
            NicknameChange::Renamed {
                old: member.display_name.clone(),
                new,
                badge,
            }
        }
        Err(GatewayError::PermissionDenied(what)) => {
            warn!(user = %member.user_id, %what, "Missing permission to change nickname");
            NicknameChange::Denied
        }
        Err(e) => {
            warn!(user = %member.user_id, error = %e, "Failed to change nickname");
            NicknameChange::Failed
        }
    }
}

/// Members holding at most one role besides @everyone.
pub async fn cache_unverified(
    session: &Session,
    gateway: &dyn Gateway,
    guild: GuildId,
) -> BotResult<usize> {
    let members = gateway.members(guild).await?;
    let unverified: Vec<UserId> = members
        .iter()
        .filter(|m| m.roles.len() <= 1)
        .map(|m| m.user_id)
        .collect();
    let count = unverified.len();
    session.cache_unverified(guild, unverified);
    info!(guild = %guild, count, "Cached unverified members");
    Ok(count)
}
