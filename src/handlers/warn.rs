//! Warning handlers: warn, warnings, clearwarnings.

use super::core::{Access, CommandSpec, Context, Handler, Param, ParamKind};
use crate::error::{BotError, BotResult};
use crate::platform::Permission;
use crate::services::{Escalation, issue_warning};
use crate::state::ESCALATION_THRESHOLD;
use async_trait::async_trait;
use chrono::Utc;

const NO_REASON: &str = "No reason provided";

/// How many records `warnings` shows.
const SHOWN_WARNINGS: usize = 5;

// ============================================================================
// warn
// ============================================================================

static WARN_PARAMS: [Param; 2] = [
    Param::required("user", ParamKind::User, "Member to warn"),
    Param::optional("reason", ParamKind::String, "Reason for the warning"),
];

static WARN: CommandSpec = CommandSpec {
    name: "warn",
    description: "Warn a user for rule violations",
    params: &WARN_PARAMS,
    access: Access::AdminOr(Permission::ModerateMembers),
};

pub struct WarnHandler;

#[async_trait]
impl Handler for WarnHandler {
    fn spec(&self) -> &'static CommandSpec {
        &WARN
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let target = ctx.args.user("user")?;
        let reason = ctx.args.opt_string("reason").unwrap_or(NO_REASON).to_string();

        let report = issue_warning(
            ctx.session,
            ctx.gateway,
            ctx.guild_id,
            target,
            ctx.requester,
            &reason,
            Utc::now(),
        )
        .await?;

        ctx.reply(&format!(
            "{} has been warned | Reason: {reason}\nTotal warnings: {}",
            target.mention(),
            report.count
        ))
        .await?;

        let mut dm = format!(
            "You have been warned by a moderator.\nReason: {reason}\nWarning count: {}",
            report.count
        );
        if report.count >= ESCALATION_THRESHOLD {
            dm.push_str(
                "\nYou have accumulated 3 or more warnings. Further violations may result in a mute or ban.",
            );
        }
        if ctx.gateway.send_direct(target, &dm).await.is_err() {
            ctx.follow_up("Could not DM user about their warning.", true)
                .await?;
        }

        ctx.log_action(&format!(
            "**User Warned** {} | Reason: {reason} | Warning count: {} | Moderator: {}",
            target.mention(),
            report.count,
            ctx.requester.mention()
        ))
        .await;

        match report.escalation {
            Escalation::None => Ok(()),
            Escalation::TimedOut { .. } => {
                ctx.follow_up(
                    &format!(
                        "{} has been automatically timed out for 1 hour after receiving 3 warnings.",
                        target.mention()
                    ),
                    false,
                )
                .await
            }
            Escalation::Failed(_) => {
                ctx.follow_up(
                    "Could not apply automatic timeout. Please check bot permissions.",
                    true,
                )
                .await
            }
        }
    }
}

// ============================================================================
// warnings
// ============================================================================

static WARNINGS_PARAMS: [Param; 1] = [Param::required(
    "user",
    ParamKind::User,
    "Member to look up",
)];

static WARNINGS: CommandSpec = CommandSpec {
    name: "warnings",
    description: "Check warnings for a user",
    params: &WARNINGS_PARAMS,
    // Self lookups are open to everyone; checked in the handler.
    access: Access::Everyone,
};

pub struct WarningsHandler;

#[async_trait]
impl Handler for WarningsHandler {
    fn spec(&self) -> &'static CommandSpec {
        &WARNINGS
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let target = ctx.args.user("user")?;
        if target != ctx.requester && !ctx.has_permission(Permission::ModerateMembers).await? {
            return ctx
                .reply_private("You do not have permission to check other users' warnings.")
                .await;
        }

        let Some(bucket) = ctx.session.warnings.get(ctx.guild_id, target) else {
            return ctx
                .reply_private(&format!("{} has no warnings.", target.mention()))
                .await;
        };

        let mut text = format!(
            "**Warnings for {}**\nTotal warnings: {}",
            target.mention(),
            bucket.count
        );
        let recent = bucket.recent(SHOWN_WARNINGS);
        // Numbered as clearwarnings indexes them.
        let first = bucket.warnings.len() - recent.len() + 1;
        for (i, warning) in recent.iter().enumerate() {
            text.push_str(&format!(
                "\n**Warning {}:** {} | Moderator: {} | Date: <t:{}:R>",
                first + i,
                warning.reason,
                warning.moderator.mention(),
                warning.timestamp.timestamp()
            ));
        }
        ctx.reply_private(&text).await
    }
}

// ============================================================================
// clearwarnings
// ============================================================================

static CLEAR_WARNINGS_PARAMS: [Param; 3] = [
    Param::required("user", ParamKind::User, "Member whose warnings to clear"),
    Param::optional("all", ParamKind::Bool, "Clear every warning (default: true)"),
    Param::optional("index", ParamKind::Integer, "1-based warning to clear"),
];

static CLEAR_WARNINGS: CommandSpec = CommandSpec {
    name: "clearwarnings",
    description: "Clear all warnings for a user",
    params: &CLEAR_WARNINGS_PARAMS,
    access: Access::AdminOr(Permission::Administrator),
};

pub struct ClearWarningsHandler;

#[async_trait]
impl Handler for ClearWarningsHandler {
    fn spec(&self) -> &'static CommandSpec {
        &CLEAR_WARNINGS
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let target = ctx.args.user("user")?;
        let index = ctx.args.opt_integer("index");
        // An explicit index without `all` means "just this one".
        let clear_all = ctx.args.opt_bool("all").unwrap_or(index.is_none());

        let message = if clear_all {
            ctx.session.warnings.clear_all(ctx.guild_id, target)?;
            format!("All warnings for {} have been cleared.", target.mention())
        } else {
            let index = index.ok_or(BotError::MissingArgument("index"))?;
            let position = usize::try_from(index).unwrap_or(0);
            ctx.session
                .warnings
                .clear_one(ctx.guild_id, target, position)?;
            format!("Warning #{index} for {} has been cleared.", target.mention())
        };

        ctx.reply(&message).await?;
        ctx.log_action(&format!(
            "**Warnings Cleared** {message} Moderator: {}",
            ctx.requester.mention()
        ))
        .await;
        Ok(())
    }
}
