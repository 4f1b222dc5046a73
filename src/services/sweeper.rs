//! Welcome prompt expiry.
//!
//! Runs every `welcome.sweep_interval_secs` and deletes prompts older than
//! `welcome.max_age_secs`.

use crate::platform::{Gateway, GatewayError, MessageId, UserId};
use crate::state::Session;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Prompts past their age limit.
    pub stale: usize,
    /// Entries dropped from the mirror.
    pub removed: usize,
    /// Deletes that failed and will be retried next pass.
    pub retained: usize,
}

/// Spawn the sweeper background task.
pub fn spawn_sweeper(session: Arc<Session>, gateway: Arc<dyn Gateway>) -> JoinHandle<()> {
    let period = session.config.welcome.sweep_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let report = sweep(&session, gateway.as_ref(), Utc::now())
                .instrument(crate::telemetry::spans::sweep())
                .await;
            if report.stale > 0 {
                info!(
                    stale = report.stale,
                    removed = report.removed,
                    retained = report.retained,
                    "Welcome prompt sweep complete"
                );
            }
        }
    })
}

/// One sweep pass at `now`.
///
/// The prompt lock is taken to select stale entries and again to remove
/// them; it is never held while a delete is in flight.
pub async fn sweep(session: &Session, gateway: &dyn Gateway, now: DateTime<Utc>) -> SweepReport {
    let stale = session.welcome.stale(now, session.config.welcome.max_age());
    let mut report = SweepReport {
        stale: stale.len(),
        ..Default::default()
    };
    if stale.is_empty() {
        return report;
    }

    let channel = session.config.bot.welcome_channel_id;
    let mut done: Vec<(UserId, MessageId)> = Vec::with_capacity(stale.len());
    for (user, prompt) in stale {
        match gateway.delete_message(channel, prompt.message_id).await {
            Ok(()) => done.push((user, prompt.message_id)),
            Err(GatewayError::NotFound(_)) => {
                debug!(user = %user, message = %prompt.message_id, "Stale prompt already deleted");
                done.push((user, prompt.message_id));
            }
            Err(e) => {
                warn!(user = %user, error = %e, "Failed to delete stale prompt");
                report.retained += 1;
            }
        }
    }

    match session.welcome.remove_expired(&done) {
        Ok(removed) => report.removed = removed,
        Err(e) => error!(error = %e, "Failed to persist welcome prompts"),
    }
    crate::metrics::record_prompts_expired(report.removed);
    crate::metrics::set_pending_prompts(session.welcome.len());
    report
}
