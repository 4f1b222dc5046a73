//! rosterd - roster verification and moderation bot for Discord communities.
//!
//! Members verify by email against program roster exports, receive their
//! program roles and a badged nickname, and moderators get warnings with
//! automatic escalation plus the usual member, channel and role commands.

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod metrics;
pub mod nickname;
pub mod platform;
pub mod roles;
pub mod roster;
pub mod services;
pub mod state;
pub mod telemetry;
