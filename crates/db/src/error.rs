//! Error type of the posting repositories.
//!
//! Domain failures arrive as [`PostingError`]; raw database failures are
//! kept as [`DbErr`] until they are classified, so lost races surface as
//! `Conflict` (retryable), running totals pushed past the column range as
//! `Validation`, and everything else as `Internal`.

use sea_orm::{DbErr, RuntimeErr, SqlErr};
use stockledger_core::inventory::InventoryError;
use stockledger_core::ledger::LedgerError;
use stockledger_core::payment::PaymentError;
use stockledger_core::posting::{ErrorKind, PostingError};
use thiserror::Error;

/// Serialization failure and deadlock, both lost races.
const RETRYABLE_SQLSTATES: [&str; 2] = ["40001", "40P01"];

/// `numeric_value_out_of_range`, raised when a balance update overflows its column.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Errors returned by repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Domain rule violation or missing record.
    #[error(transparent)]
    Posting(#[from] PostingError),

    /// Database failure.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Result type for repository operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<LedgerError> for StoreError {
    fn from(err: LedgerError) -> Self {
        Self::Posting(err.into())
    }
}

impl From<InventoryError> for StoreError {
    fn from(err: InventoryError) -> Self {
        Self::Posting(err.into())
    }
}

impl From<PaymentError> for StoreError {
    fn from(err: PaymentError) -> Self {
        Self::Posting(err.into())
    }
}

impl StoreError {
    /// Creates a not-found error.
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::Posting(PostingError::not_found(resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Posting(PostingError::Validation(message.into()))
    }

    /// Classifies this error into the posting taxonomy.
    #[must_use]
    pub fn into_posting(self) -> PostingError {
        match self {
            Self::Posting(err) => err,
            Self::Database(err) => classify_db_err(&err),
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Posting(err) => err.kind(),
            Self::Database(err) => classify_db_err(err).kind(),
        }
    }
}

/// Maps a database error onto `Conflict`, `Validation` or `Internal`.
#[must_use]
pub fn classify_db_err(err: &DbErr) -> PostingError {
    if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() {
        return PostingError::Conflict(message);
    }
    match sqlstate(err).as_deref() {
        Some(code) if RETRYABLE_SQLSTATES.contains(&code) => {
            PostingError::Conflict(err.to_string())
        }
        Some(NUMERIC_OUT_OF_RANGE) => {
            PostingError::Validation("Resulting balance exceeds the stored range".to_string())
        }
        _ => PostingError::Internal(err.to_string()),
    }
}

fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e))
        | DbErr::Conn(RuntimeErr::SqlxError(e)) => e
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}
