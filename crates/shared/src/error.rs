//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// A voucher violated a business invariant before push.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No active gateway configuration exists.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network or HTTP-level failure talking to the gateway.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Remote XML could not be parsed even after pre-cleaning.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Local store error (surfaced from the storage collaborator).
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Returns true when the operation failed before any network call.
    ///
    /// Validation and configuration failures block the push entirely, so
    /// the remote system is guaranteed untouched.
    #[must_use]
    pub const fn is_pre_network(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Configuration(_))
    }
}
