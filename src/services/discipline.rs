//! Warning escalation.

use crate::error::BotResult;
use crate::platform::{Gateway, GatewayError, GuildId, UserId};
use crate::state::Session;
use crate::state::warnings::auto_timeout;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

pub const AUTO_TIMEOUT_REASON: &str = "Automatic timeout after 3 warnings";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Escalation {
    None,
    TimedOut { until: DateTime<Utc> },
    /// The timeout was due but the platform call failed.
    Failed(GatewayError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningReport {
    pub count: u32,
    pub escalation: Escalation,
}

/// Record a warning and apply the automatic timeout when it is due.
///
/// The warning stays recorded even if the timeout fails.
pub async fn issue_warning(
    session: &Session,
    gateway: &dyn Gateway,
    guild: GuildId,
    user: UserId,
    moderator: UserId,
    reason: &str,
    now: DateTime<Utc>,
) -> BotResult<WarningReport> {
    let outcome = session
        .warnings
        .add_warning(guild, user, reason, moderator, now)?;
    crate::metrics::record_warning();
    info!(user = %user, moderator = %moderator, count = outcome.count, "Warning issued");

    if !outcome.escalate {
        return Ok(WarningReport {
            count: outcome.count,
            escalation: Escalation::None,
        });
    }

    let until = now + auto_timeout();
    let escalation = match gateway.timeout(guild, user, until, AUTO_TIMEOUT_REASON).await {
        Ok(()) => {
            info!(user = %user, until = %until, "Automatic timeout applied");
            Escalation::TimedOut { until }
        }
        Err(e) => {
            warn!(user = %user, error = %e, "Automatic timeout failed");
            Escalation::Failed(e)
        }
    };
    crate::metrics::record_auto_timeout(matches!(escalation, Escalation::TimedOut { .. }));

    Ok(WarningReport {
        count: outcome.count,
        escalation,
    })
}
