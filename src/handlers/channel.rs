//! Channel management handlers: createchannel, deletechannel, slowmode.

use super::core::{Access, CommandSpec, Context, Handler, Param, ParamKind};
use crate::error::{BotError, BotResult};
use crate::platform::Permission;
use async_trait::async_trait;

/// Longest slowmode the platform accepts (6 hours).
pub const MAX_SLOWMODE_SECS: i64 = 21_600;

static CREATE_CHANNEL_PARAMS: [Param; 2] = [
    Param::required("name", ParamKind::String, "Name of the channel"),
    Param::optional("topic", ParamKind::String, "Channel topic"),
];

static CREATE_CHANNEL: CommandSpec = CommandSpec {
    name: "createchannel",
    description: "Create a new text channel",
    params: &CREATE_CHANNEL_PARAMS,
    access: Access::AdminOr(Permission::ManageChannels),
};

pub struct CreateChannelHandler;

#[async_trait]
impl Handler for CreateChannelHandler {
    fn spec(&self) -> &'static CommandSpec {
        &CREATE_CHANNEL
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let name = ctx.args.string("name")?.to_string();
        let topic = ctx.args.opt_string("topic").map(str::to_string);

        let channel = ctx
            .gateway
            .create_text_channel(ctx.guild_id, &name, topic.as_deref())
            .await?;
        ctx.reply(&format!("Channel {} has been created.", channel.mention()))
            .await?;
        ctx.log_action(&format!(
            "**Channel Created** {} | Moderator: {}",
            channel.mention(),
            ctx.requester.mention()
        ))
        .await;
        Ok(())
    }
}

static DELETE_CHANNEL_PARAMS: [Param; 1] = [Param::required(
    "channel",
    ParamKind::Channel,
    "Channel to delete",
)];

static DELETE_CHANNEL: CommandSpec = CommandSpec {
    name: "deletechannel",
    description: "Delete a channel",
    params: &DELETE_CHANNEL_PARAMS,
    access: Access::AdminOr(Permission::ManageChannels),
};

pub struct DeleteChannelHandler;

#[async_trait]
impl Handler for DeleteChannelHandler {
    fn spec(&self) -> &'static CommandSpec {
        &DELETE_CHANNEL
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let channel = ctx.args.channel("channel")?;
        ctx.gateway.delete_channel(channel).await?;
        // The reply may land in the channel that was just deleted.
        if channel != ctx.channel_id {
            ctx.reply(&format!("Channel `{channel}` has been deleted."))
                .await?;
        }
        ctx.log_action(&format!(
            "**Channel Deleted** `{channel}` | Moderator: {}",
            ctx.requester.mention()
        ))
        .await;
        Ok(())
    }
}

static SLOWMODE_PARAMS: [Param; 2] = [
    Param::required("seconds", ParamKind::Integer, "Delay between messages (0 disables)"),
    Param::optional("channel", ParamKind::Channel, "Target channel (default: this one)"),
];

static SLOWMODE: CommandSpec = CommandSpec {
    name: "slowmode",
    description: "Set slowmode for a channel",
    params: &SLOWMODE_PARAMS,
    access: Access::AdminOr(Permission::ManageChannels),
};

pub struct SlowmodeHandler;

#[async_trait]
impl Handler for SlowmodeHandler {
    fn spec(&self) -> &'static CommandSpec {
        &SLOWMODE
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let seconds = ctx.args.integer("seconds")?;
        let seconds = u16::try_from(seconds)
            .ok()
            .filter(|s| i64::from(*s) <= MAX_SLOWMODE_SECS)
            .ok_or_else(|| {
                BotError::Validation(format!(
                    "Slowmode must be between 0 and {MAX_SLOWMODE_SECS} seconds."
                ))
            })?;
        let channel = ctx.args.opt_channel("channel").unwrap_or(ctx.channel_id);

        ctx.gateway.set_slowmode(channel, seconds).await?;
        let message = if seconds == 0 {
            format!("Slowmode disabled in {}.", channel.mention())
        } else {
            format!("Slowmode set to {seconds} seconds in {}.", channel.mention())
        };
        ctx.reply(&message).await?;
        ctx.log_action(&format!(
            "**Slowmode** {message} Moderator: {}",
            ctx.requester.mention()
        ))
        .await;
        Ok(())
    }
}
