//! Unified error handling for rosterd.
//!
//! Command handlers and services return [`BotError`]. The taxonomy decides how
//! a failure is surfaced: benign "not found" results and validation failures
//! are shown to the invoking user as-is, permission problems become a refusal,
//! and anything unexpected is logged and reported generically.

use crate::platform::GatewayError;
use crate::state::persistence::StoreError;
use thiserror::Error;

// ============================================================================
// Bot Errors (command processing)
// ============================================================================

#[derive(Debug, Error)]
pub enum BotError {
    /// Benign miss: unmatched email, message already gone, no warnings.
    #[error("{0}")]
    NotFound(String),

    /// The bot or the invoking user lacks a permission.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Rejected input. Raised before any mutation.
    #[error("{0}")]
    Validation(String),

    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid value for {name}: {value}")]
    BadArgument { name: &'static str, value: String },

    #[error("unexpected: {0}")]
    Unexpected(String),
}

impl BotError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::PermissionDenied(_) => "permission_denied",
            Self::Validation(_) => "validation",
            Self::MissingArgument(_) => "missing_argument",
            Self::BadArgument { .. } => "bad_argument",
            Self::Unexpected(_) => "unexpected",
        }
    }

    /// Message shown to the invoking user.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(msg) | Self::Validation(msg) => msg.clone(),
            Self::PermissionDenied(_) => {
                "I don't have permission to do that, or you don't.".to_string()
            }
            Self::MissingArgument(name) => format!("Missing required argument: `{name}`"),
            Self::BadArgument { name, value } => {
                format!("Invalid value `{value}` for `{name}`.")
            }
            Self::Unexpected(_) => "An error occurred while executing the command.".to_string(),
        }
    }

    /// Whether the failure should be logged at error level.
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Self::Unexpected(_))
    }
}

impl From<GatewayError> for BotError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(what) => Self::NotFound(format!("Not found: {what}")),
            GatewayError::PermissionDenied(what) => Self::PermissionDenied(what),
            GatewayError::Other(what) => Self::Unexpected(what),
        }
    }
}

impl From<StoreError> for BotError {
    fn from(err: StoreError) -> Self {
        Self::Unexpected(err.to_string())
    }
}

/// Result type for command handlers.
pub type BotResult<T = ()> = Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(BotError::NotFound("x".into()).error_code(), "not_found");
        assert_eq!(BotError::MissingArgument("user").error_code(), "missing_argument");
        assert_eq!(BotError::Unexpected("boom".into()).error_code(), "unexpected");
    }

    #[test]
    fn test_gateway_error_mapping() {
        let err: BotError = GatewayError::PermissionDenied("edit member".into()).into();
        assert!(matches!(err, BotError::PermissionDenied(_)));

        let err: BotError = GatewayError::Other("500".into()).into();
        assert!(err.is_unexpected());
        assert_eq!(err.user_message(), "An error occurred while executing the command.");
    }

    #[test]
    fn test_validation_is_shown_verbatim() {
        let err = BotError::Validation("Invalid warning index. User has 2 warnings.".into());
        assert_eq!(err.user_message(), "Invalid warning index. User has 2 warnings.");
    }
}
