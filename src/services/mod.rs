//! Bot services.
//!
//! Services hold the logic behind commands and gateway events. They take the
//! [`Session`](crate::state::Session) and a [`Gateway`](crate::platform::Gateway)
//! and return plain outcomes; wording replies is left to the handlers.

pub mod discipline;
pub mod join;
pub mod sweeper;
pub mod verification;

pub use discipline::{Escalation, WarningReport, issue_warning};
pub use join::on_member_join;
pub use sweeper::{SweepReport, spawn_sweeper, sweep};
pub use verification::{NicknameChange, Verification, VerifyOutcome, cache_unverified, verify_member};
