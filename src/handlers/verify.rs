//! Verification command handlers: verify, adminverify, cacheunverified.

use super::core::{Access, CommandSpec, Context, Handler, Param, ParamKind};
use crate::error::BotResult;
use crate::platform::UserId;
use crate::services::{NicknameChange, Verification, VerifyOutcome, cache_unverified, verify_member};
use async_trait::async_trait;
use chrono::Utc;

const PROGRAM: &str = "GSSoC'24 Extended";
const WOB_PROGRAM: &str = "Winter Of Blockchain 2024";

fn congratulations(v: &Verification) -> String {
    let program = if v.is_wob() { WOB_PROGRAM } else { PROGRAM };
    format!(
        ":tada: Congratulations! {} :tada:, you're selected as `{}` for {program}.",
        v.member.user_id.mention(),
        v.role_list()
    )
}

/// Follow-up describing what happened to the nickname, if worth saying.
fn nickname_notice(user: UserId, change: &NicknameChange, self_service: bool) -> Option<String> {
    match change {
        NicknameChange::Renamed { new, badge, .. } if self_service => Some(format!(
            "{} Your username has been updated to `{new}` as per Guidelines. You are free to \
             change it, but please ensure that **{badge}** remains part of your display name.",
            user.mention()
        )),
        NicknameChange::Renamed { new, .. } => Some(format!(
            "{} Your username has been updated to `{new}` as per guidelines.",
            user.mention()
        )),
        NicknameChange::Denied => {
            Some("I couldn't update the nickname because I'm missing permissions.".to_string())
        }
        NicknameChange::Failed => Some(
            "I couldn't update the nickname. Please ask a moderator to set it for you.".to_string(),
        ),
        NicknameChange::SkippedOwner => None,
    }
}

// ============================================================================
// verify
// ============================================================================

static VERIFY_PARAMS: [Param; 1] = [Param::required(
    "email",
    ParamKind::String,
    "Your registered email id",
)];

static VERIFY: CommandSpec = CommandSpec {
    name: "verify",
    description: "Verify your registered email id to get access.",
    params: &VERIFY_PARAMS,
    access: Access::Everyone,
};

pub struct VerifyHandler;

#[async_trait]
impl Handler for VerifyHandler {
    fn spec(&self) -> &'static CommandSpec {
        &VERIFY
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let channel = ctx.session.config.bot.verification_channel_id;
        if ctx.channel_id != channel {
            return ctx
                .reply_private(&format!("This command can only be used in {}.", channel.mention()))
                .await;
        }
        let email = ctx.args.string("email")?.to_string();

        ctx.request.defer_reply(true).await?;
        let outcome = verify_member(
            ctx.session,
            ctx.gateway,
            ctx.guild_id,
            ctx.requester,
            &email,
            Utc::now(),
        )
        .await?;

        match outcome {
            VerifyOutcome::NotInRoster => {
                ctx.reply_private(
                    "This email is not in our records. Contact a moderator in case of any errors.",
                )
                .await
            }
            VerifyOutcome::Unmappable(_) => {
                ctx.reply_private("Sorry, we couldn't verify your email at this time.")
                    .await
            }
            VerifyOutcome::Verified(v) => {
                ctx.reply_private(&congratulations(&v)).await?;
                if let Some(notice) = nickname_notice(ctx.requester, &v.nickname, true) {
                    ctx.follow_up(&notice, true).await?;
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// adminverify
// ============================================================================

static ADMIN_VERIFY_PARAMS: [Param; 2] = [
    Param::required("user", ParamKind::User, "Member to verify"),
    Param::required("email", ParamKind::String, "Their registered email id"),
];

static ADMIN_VERIFY: CommandSpec = CommandSpec {
    name: "adminverify",
    description: "Admin command to verify a user by providing their email.",
    params: &ADMIN_VERIFY_PARAMS,
    access: Access::AdminOnly,
};

pub struct AdminVerifyHandler;

#[async_trait]
impl Handler for AdminVerifyHandler {
    fn spec(&self) -> &'static CommandSpec {
        &ADMIN_VERIFY
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let target = ctx.args.user("user")?;
        let email = ctx.args.string("email")?.to_string();

        ctx.request.defer_reply(true).await?;
        let outcome = verify_member(
            ctx.session,
            ctx.gateway,
            ctx.guild_id,
            target,
            &email,
            Utc::now(),
        )
        .await?;

        match outcome {
            VerifyOutcome::NotInRoster => {
                ctx.reply_private(&format!(
                    "The email `{email}` is not in our records. Please contact a moderator."
                ))
                .await
            }
            VerifyOutcome::Unmappable(_) => {
                ctx.reply_private(&format!(
                    "Sorry, we couldn't verify the email `{email}` at this time."
                ))
                .await
            }
            VerifyOutcome::Verified(v) => {
                ctx.reply_private(&format!(
                    ":tada: {} has been successfully verified as `{}`.",
                    target.mention(),
                    v.role_list()
                ))
                .await?;
                if let Some(notice) = nickname_notice(target, &v.nickname, false) {
                    ctx.follow_up(&notice, true).await?;
                }
                ctx.log_action(&format!(
                    "{} verified {} as `{}`",
                    ctx.requester.mention(),
                    target.mention(),
                    v.role_list()
                ))
                .await;
                Ok(())
            }
        }
    }
}

// ============================================================================
// cacheunverified
// ============================================================================

static CACHE_UNVERIFIED: CommandSpec = CommandSpec {
    name: "cacheunverified",
    description: "Cache members needing reassignment.",
    params: &[],
    access: Access::AdminOnly,
};

pub struct CacheUnverifiedHandler;

#[async_trait]
impl Handler for CacheUnverifiedHandler {
    fn spec(&self) -> &'static CommandSpec {
        &CACHE_UNVERIFIED
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let count = cache_unverified(ctx.session, ctx.gateway, ctx.guild_id).await?;
        ctx.reply(&format!("Successfully cached {count} unverified member(s)."))
            .await
    }
}
