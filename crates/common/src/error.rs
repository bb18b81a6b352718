//! Error types for ballot-rs.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Caller Errors ===
    /// The poll does not exist, has no options, or could not be created.
    #[error("Invalid poll: {0}")]
    InvalidPoll(String),

    /// The voter has already used all of their votes.
    #[error("No more votes available")]
    NoMoreVotes,

    /// The option index is outside the poll's option list.
    #[error("Option index out of range: {0}")]
    OptionOutOfRange(i32),

    // === Store Errors ===
    /// The underlying store failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration could not be loaded or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPoll(_) => "INVALID_POLL",
            Self::NoMoreVotes => "NO_MORE_VOTES",
            Self::OptionOutOfRange(_) => "OPTION_OUT_OF_RANGE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error originated in the store rather than the caller.
    #[must_use]
    pub const fn is_store_error(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Config(_) | Self::Internal(_))
    }
}

// === From implementations ===

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            AppError::InvalidPoll("missing".into()).error_code(),
            "INVALID_POLL"
        );
        assert_eq!(AppError::NoMoreVotes.error_code(), "NO_MORE_VOTES");
        assert_eq!(
            AppError::OptionOutOfRange(7).error_code(),
            "OPTION_OUT_OF_RANGE"
        );
    }

    #[test]
    fn caller_errors_are_not_store_errors() {
        assert!(!AppError::NoMoreVotes.is_store_error());
        assert!(!AppError::OptionOutOfRange(-1).is_store_error());
        assert!(AppError::Database("down".into()).is_store_error());
    }
}
