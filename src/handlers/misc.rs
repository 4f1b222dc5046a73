//! Informational handlers.

use super::core::{Access, CommandSpec, Context, Handler};
use crate::error::BotResult;
use async_trait::async_trait;

static ABOUT: CommandSpec = CommandSpec {
    name: "about",
    description: "Learn more about this bot",
    params: &[],
    access: Access::Everyone,
};

pub struct AboutHandler;

#[async_trait]
impl Handler for AboutHandler {
    fn spec(&self) -> &'static CommandSpec {
        &ABOUT
    }

    async fn handle(&self, ctx: &mut Context<'_>) -> BotResult {
        let uptime = chrono::Utc::now() - ctx.session.started_at;
        let text = format!(
            "**About GSSoC Manager** v{}\n\
             Verifies contributors against the program roster and helps moderators keep the server tidy.\n\
             \n\
             **Features**\n\
             • Email verification with automatic role and nickname assignment\n\
             • Warnings with automatic timeout on the third\n\
             • Member, channel and role moderation commands\n\
             • Welcome prompts that clean themselves up\n\
             \n\
             Roster: {} emails across {} roles | Uptime: {}h {}m",
            env!("CARGO_PKG_VERSION"),
            ctx.session.roster.total_emails(),
            ctx.session.roster.roles().count(),
            uptime.num_hours(),
            uptime.num_minutes() % 60,
        );
        ctx.reply(&text).await
    }
}
