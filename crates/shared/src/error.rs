//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Process-level failures raised while starting the service.
///
/// Request failures (unbalanced entries, insufficient stock, ...) are
/// `PostingError`s in `stockledger-core`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The database could not be reached.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
