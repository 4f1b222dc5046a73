//! Telemetry utilities for command timing and tracing spans.

use std::time::Instant;

/// Guard for timing command execution and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: &'static str,
    start: Instant,
}

impl CommandTimer {
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(self.command, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use crate::platform::{ChannelId, GuildId, UserId};
    use tracing::{Span, info_span};

    /// Span for one dispatched command.
    pub fn command(name: &str, source: UserId, guild: GuildId, channel: ChannelId) -> Span {
        info_span!("command", name = %name, source = %source, guild = %guild, channel = %channel)
    }

    /// Span for one sweeper pass.
    pub fn sweep() -> Span {
        info_span!("sweep")
    }
}
