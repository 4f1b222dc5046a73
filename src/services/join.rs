//! New member onboarding.

use crate::error::BotResult;
use crate::platform::{Gateway, GuildId, UserId};
use crate::state::{Session, WelcomePrompt};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Grant the auto-assigned role and post a tracked welcome prompt.
pub async fn on_member_join(
    session: &Session,
    gateway: &dyn Gateway,
    guild: GuildId,
    user: UserId,
    now: DateTime<Utc>,
) -> BotResult {
    crate::metrics::record_member_joined();

    if let Some(role) = session.catalog.auto_assigned()
        && let Err(e) = gateway.add_role(guild, user, role).await
    {
        warn!(user = %user, error = %e, "Failed to assign auto role");
    }

    let channel = session.config.bot.welcome_channel_id;
    let content = session.config.welcome.render(&user.mention());
    let message_id = gateway.send_message(channel, &content).await?;
    session.welcome.track(
        user,
        WelcomePrompt {
            message_id,
            created_at: now,
        },
    )?;
    crate::metrics::set_pending_prompts(session.welcome.len());
    info!(user = %user, message = %message_id, "Welcome prompt posted");
    Ok(())
}
