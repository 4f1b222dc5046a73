//! Prometheus metrics collection for rosterd.
//!
//! Exposed on the optional HTTP endpoint (see [`crate::http`]).
//!
//! - `rosterd_command_total{command}` - Commands dispatched by name
//! - `rosterd_command_duration_seconds{command}` - Command latency histogram
//! - `rosterd_command_errors_total{command,error}` - Failures by error code
//! - `rosterd_verifications_total{result}` - Verification attempts by outcome

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Commands
// ========================================================================

pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Command errors by command and error code.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Membership
// ========================================================================

/// Verification attempts: `verified`, `not_in_roster`, `unmappable`.
pub static VERIFICATIONS: OnceLock<IntCounterVec> = OnceLock::new();

pub static MEMBERS_JOINED: OnceLock<IntCounter> = OnceLock::new();

/// Welcome prompts currently tracked.
pub static PENDING_PROMPTS: OnceLock<IntGauge> = OnceLock::new();

/// Welcome prompts removed by the sweeper.
pub static PROMPTS_EXPIRED: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Moderation
// ========================================================================

pub static WARNINGS_ISSUED: OnceLock<IntCounter> = OnceLock::new();

/// Automatic timeouts, labelled `applied` or `failed`.
pub static AUTO_TIMEOUTS: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at startup before any metrics are recorded.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("rosterd_command_total", "Commands dispatched by name"), &["command"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("rosterd_command_duration_seconds", "Command latency by name")
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("rosterd_command_errors_total", "Command errors by code"), &["command", "error"]));

    register!(VERIFICATIONS, IntCounterVec::new(Opts::new("rosterd_verifications_total", "Verification attempts by outcome"), &["result"]));
    register!(MEMBERS_JOINED, IntCounter::new("rosterd_members_joined_total", "Members that joined the guild"));
    register!(PENDING_PROMPTS, IntGauge::new("rosterd_pending_prompts", "Welcome prompts awaiting verification"));
    register!(PROMPTS_EXPIRED, IntCounter::new("rosterd_prompts_expired_total", "Welcome prompts removed by the sweeper"));

    register!(WARNINGS_ISSUED, IntCounter::new("rosterd_warnings_issued_total", "Warnings issued"));
    register!(AUTO_TIMEOUTS, IntCounterVec::new(Opts::new("rosterd_auto_timeouts_total", "Automatic timeouts after repeated warnings"), &["result"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Recording helpers (no-ops until init() has run)
// ============================================================================

/// Record a command execution with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

#[inline]
pub fn record_verification(result: &str) {
    if let Some(c) = VERIFICATIONS.get() {
        c.with_label_values(&[result]).inc();
    }
}

#[inline]
pub fn record_member_joined() {
    if let Some(c) = MEMBERS_JOINED.get() {
        c.inc();
    }
}

#[inline]
pub fn set_pending_prompts(count: usize) {
    if let Some(g) = PENDING_PROMPTS.get() {
        g.set(count as i64);
    }
}

#[inline]
pub fn record_prompts_expired(count: usize) {
    if let Some(c) = PROMPTS_EXPIRED.get() {
        c.inc_by(count as u64);
    }
}

#[inline]
pub fn record_warning() {
    if let Some(c) = WARNINGS_ISSUED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_auto_timeout(applied: bool) {
    if let Some(c) = AUTO_TIMEOUTS.get() {
        c.with_label_values(&[if applied { "applied" } else { "failed" }]).inc();
    }
}
