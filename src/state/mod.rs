//! State management module.
//!
//! Contains the [`Session`] (shared bot state) and the JSON-backed stores it owns.

pub mod persistence;
pub mod records;
mod session;
pub mod warnings;
pub mod welcome;

pub use persistence::StoreError;
pub use records::{UsernameChange, VerificationRecord, WarningBucket, WarningRecord, WelcomePrompt};
pub use session::Session;
pub use warnings::{ESCALATION_THRESHOLD, WarningBook, WarningOutcome};
pub use welcome::WelcomePrompts;
