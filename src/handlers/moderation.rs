//! Member and channel moderation handlers.
//!
//! ban, unban, kick, timeout, hide, unhide, lock, unlock, clear.

use super::core::{Access, CommandSpec, Context, Handler, Param, ParamKind};
use crate::error::{BotError, BotResult};
use crate::platform::{GatewayError, Permission};
use async_trait::async_trait;
use chrono::{Duration, Utc};

const NO_REASON: &str = "No reason provided";

/// Platform ceiling for a member timeout.
const MAX_TIMEOUT_DAYS: i64 = 28;

// ============================================================================
// ban / unban / kick
// ============================================================================

static BAN_PARAMS: [Param; 2] = [
    Param::required("user", ParamKind::User, "Member to ban"),
    Param::optional("reason", ParamKind::String, "Reason for the ban"),
];

static BAN: CommandSpec = CommandSpec {
    name: "ban",
    description: "Ban a user from the server",
    params: &BAN_PARAMS,
    access: Access::AdminOnly,
};

pub struct BanHandler;

#[async_trait]
impl Handler for BanHandler {
    fn spec(&self) -> &'static CommandSpec {
        &BAN
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let target = ctx.args.user("user")?;
        let reason = ctx.args.opt_string("reason").unwrap_or(NO_REASON).to_string();

        ctx.gateway.ban(ctx.guild_id, target, &reason).await?;
        ctx.reply(&format!(
            "{} has been banned for reason: {reason}",
            target.mention()
        ))
        .await?;
        ctx.log_action(&format!(
            "**User Banned** {} | Reason: {reason} | Moderator: {}",
            target.mention(),
            ctx.requester.mention()
        ))
        .await;
        Ok(())
    }
}

static UNBAN_PARAMS: [Param; 1] = [Param::required("user", ParamKind::User, "User to unban")];

static UNBAN: CommandSpec = CommandSpec {
    name: "unban",
    description: "Unban a user from the server",
    params: &UNBAN_PARAMS,
    access: Access::AdminOnly,
};

pub struct UnbanHandler;

#[async_trait]
impl Handler for UnbanHandler {
    fn spec(&self) -> &'static CommandSpec {
        &UNBAN
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let target = ctx.args.user("user")?;
        match ctx.gateway.unban(ctx.guild_id, target).await {
            Ok(()) => {}
            Err(GatewayError::NotFound(_)) => {
                return Err(BotError::NotFound(format!(
                    "{} is not in the ban list.",
                    target.mention()
                )));
            }
            Err(e) => return Err(e.into()),
        }
        ctx.reply(&format!("{} has been unbanned.", target.mention()))
            .await?;
        ctx.log_action(&format!(
            "**User Unbanned** {} | Moderator: {}",
            target.mention(),
            ctx.requester.mention()
        ))
        .await;
        Ok(())
    }
}

static KICK_PARAMS: [Param; 2] = [
    Param::required("user", ParamKind::User, "Member to kick"),
    Param::optional("reason", ParamKind::String, "Reason for the kick"),
];

static KICK: CommandSpec = CommandSpec {
    name: "kick",
    description: "Kick a user from the server",
    params: &KICK_PARAMS,
    access: Access::AdminOnly,
};

pub struct KickHandler;

#[async_trait]
impl Handler for KickHandler {
    fn spec(&self) -> &'static CommandSpec {
        &KICK
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let target = ctx.args.user("user")?;
        let reason = ctx.args.opt_string("reason").unwrap_or(NO_REASON).to_string();

        ctx.gateway.kick(ctx.guild_id, target, &reason).await?;
        ctx.reply(&format!(
            "{} has been kicked for reason: {reason}",
            target.mention()
        ))
        .await?;
        ctx.log_action(&format!(
            "**User Kicked** {} | Reason: {reason} | Moderator: {}",
            target.mention(),
            ctx.requester.mention()
        ))
        .await;
        Ok(())
    }
}

// ============================================================================
// timeout
// ============================================================================

/// Units accepted by `timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub fn parse(raw: &str) -> BotResult<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "minutes" => Ok(Self::Minutes),
            "hours" => Ok(Self::Hours),
            "days" => Ok(Self::Days),
            _ => Err(BotError::Validation(
                "Invalid time unit. Use: minutes, hours, days".to_string(),
            )),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
        }
    }

    /// Length of `amount` units, bounded by the platform ceiling.
    pub fn span(self, amount: i64) -> BotResult<Duration> {
        if amount <= 0 {
            return Err(BotError::Validation(
                "Duration must be a positive number.".to_string(),
            ));
        }
        let span = match self {
            Self::Minutes => Duration::try_minutes(amount),
            Self::Hours => Duration::try_hours(amount),
            Self::Days => Duration::try_days(amount),
        };
        match span {
            Some(span) if span <= Duration::days(MAX_TIMEOUT_DAYS) => Ok(span),
            _ => Err(BotError::Validation(format!(
                "Timeouts cannot exceed {MAX_TIMEOUT_DAYS} days."
            ))),
        }
    }
}

static TIMEOUT_PARAMS: [Param; 4] = [
    Param::required("user", ParamKind::User, "Member to time out"),
    Param::optional("duration", ParamKind::Integer, "Length of the timeout (default: 5)"),
    Param::optional("unit", ParamKind::String, "minutes, hours or days (default: minutes)"),
    Param::optional("reason", ParamKind::String, "Reason for the timeout"),
];

static TIMEOUT: CommandSpec = CommandSpec {
    name: "timeout",
    description: "Timeout a user for a specified duration",
    params: &TIMEOUT_PARAMS,
    access: Access::AdminOr(Permission::ModerateMembers),
};

pub struct TimeoutHandler;

#[async_trait]
impl Handler for TimeoutHandler {
    fn spec(&self) -> &'static CommandSpec {
        &TIMEOUT
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let target = ctx.args.user("user")?;
        let amount = ctx.args.opt_integer("duration").unwrap_or(5);
        let unit = TimeUnit::parse(ctx.args.opt_string("unit").unwrap_or("minutes"))?;
        let reason = ctx.args.opt_string("reason").unwrap_or(NO_REASON).to_string();
        let until = Utc::now() + unit.span(amount)?;

        ctx.gateway
            .timeout(ctx.guild_id, target, until, &reason)
            .await?;
        ctx.reply(&format!(
            "{} has been timed out for {amount} {} | Reason: {reason}",
            target.mention(),
            unit.name()
        ))
        .await?;
        ctx.log_action(&format!(
            "**User Timed Out** {} | Duration: {amount} {} | Reason: {reason} | Moderator: {}",
            target.mention(),
            unit.name(),
            ctx.requester.mention()
        ))
        .await;
        Ok(())
    }
}

// ============================================================================
// hide / unhide / lock / unlock
// ============================================================================

/// Which @everyone overwrite a channel toggle flips.
#[derive(Debug, Clone, Copy)]
enum Toggle {
    Visible(bool),
    Writable(bool),
}

impl Toggle {
    fn verb(self) -> &'static str {
        match self {
            Self::Visible(false) => "hidden",
            Self::Visible(true) => "unhidden",
            Self::Writable(false) => "locked",
            Self::Writable(true) => "unlocked",
        }
    }
}

async fn toggle_channel(ctx: &mut Context<'_>, toggle: Toggle) -> BotResult {
    let channel = ctx.args.opt_channel("channel").unwrap_or(ctx.channel_id);
    match toggle {
        Toggle::Visible(on) => {
            ctx.gateway
                .set_channel_visible(ctx.guild_id, channel, on)
                .await?
        }
        Toggle::Writable(on) => {
            ctx.gateway
                .set_channel_writable(ctx.guild_id, channel, on)
                .await?
        }
    }
    ctx.reply(&format!(
        "Channel {} has been {}.",
        channel.mention(),
        toggle.verb()
    ))
    .await?;
    ctx.log_action(&format!(
        "**Channel {}** {} | Moderator: {}",
        toggle.verb(),
        channel.mention(),
        ctx.requester.mention()
    ))
    .await;
    Ok(())
}

static CHANNEL_PARAM: [Param; 1] = [Param::optional(
    "channel",
    ParamKind::Channel,
    "Target channel (default: this one)",
)];

macro_rules! channel_toggle {
    ($handler:ident, $spec:ident, $name:literal, $description:literal, $toggle:expr) => {
        static $spec: CommandSpec = CommandSpec {
            name: $name,
            description: $description,
            params: &CHANNEL_PARAM,
            access: Access::AdminOr(Permission::ManageChannels),
        };

        pub struct $handler;

        #[async_trait]
        impl Handler for $handler {
            fn spec(&self) -> &'static CommandSpec {
                &$spec
            }

            async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
                toggle_channel(ctx, $toggle).await
            }
        }
    };
}

channel_toggle!(HideHandler, HIDE, "hide", "Hide a channel from everyone", Toggle::Visible(false));
channel_toggle!(UnhideHandler, UNHIDE, "unhide", "Make a hidden channel visible", Toggle::Visible(true));
channel_toggle!(LockHandler, LOCK, "lock", "Lock a channel", Toggle::Writable(false));
channel_toggle!(UnlockHandler, UNLOCK, "unlock", "Unlock a channel", Toggle::Writable(true));

// ============================================================================
// clear
// ============================================================================

/// Bulk delete ceiling for a single call.
const MAX_CLEAR: i64 = 100;

static CLEAR_PARAMS: [Param; 1] = [Param::required(
    "amount",
    ParamKind::Integer,
    "Number of messages to delete",
)];

static CLEAR: CommandSpec = CommandSpec {
    name: "clear",
    description: "Clear a specified number of messages",
    params: &CLEAR_PARAMS,
    access: Access::AdminOr(Permission::ManageMessages),
};

pub struct ClearHandler;

#[async_trait]
impl Handler for ClearHandler {
    fn spec(&self) -> &'static CommandSpec {
        &CLEAR
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let amount = ctx.args.integer("amount")?;
        if !(1..=MAX_CLEAR).contains(&amount) {
            return Err(BotError::Validation(format!(
                "Please specify a valid amount to clear (1-{MAX_CLEAR})."
            )));
        }

        ctx.request.defer_reply(true).await?;
        let cleared = ctx.gateway.purge(ctx.channel_id, amount.unsigned_abs()).await?;
        ctx.reply_private(&format!("🧹 Cleared {cleared} messages."))
            .await?;
        ctx.log_action(&format!(
            "**Messages Cleared** {cleared} in {} | Moderator: {}",
            ctx.channel_id.mention(),
            ctx.requester.mention()
        ))
        .await;
        Ok(())
    }
}
