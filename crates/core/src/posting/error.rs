//! Unified error type for the posting engine.
//!
//! Each domain module keeps its own `thiserror` enum. `PostingError` wraps
//! them and classifies every failure into one [`ErrorKind`], which decides
//! the HTTP status and whether a caller may retry.

use serde_json::{Value, json};
use thiserror::Error;

use crate::inventory::InventoryError;
use crate::ledger::LedgerError;
use crate::payment::PaymentError;

/// Failure classes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced entity, account, item or warehouse does not exist.
    NotFound,
    /// Malformed or incomplete request.
    Validation,
    /// Journal lines do not net to zero.
    Unbalanced,
    /// Decrementing stock would go negative.
    InsufficientStock,
    /// Voucher operations do not sum to the voucher total.
    AmountMismatch,
    /// A concurrent update lost a race.
    Conflict,
    /// Unexpected or database-level failure.
    Internal,
}

impl ErrorKind {
    /// Returns the HTTP status code for this kind.
    #[must_use]
    pub const fn http_status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::InsufficientStock | Self::Conflict => 409,
            Self::Unbalanced | Self::AmountMismatch => 422,
            Self::Internal => 500,
        }
    }
}

/// Errors returned by posting operations.
#[derive(Debug, Error)]
pub enum PostingError {
    /// Journal validation or lifecycle failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Stock movement failure.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Payment voucher failure.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// A collaborator record is missing.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Kind of record, e.g. "item".
        resource: &'static str,
        /// The missing id.
        id: String,
    },

    /// Request failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Concurrent modification detected.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unexpected failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for posting operations.
pub type PostingResult<T> = Result<T, PostingError>;

impl PostingError {
    /// Creates a not-found error for a collaborator record.
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Ledger(e) => e.kind(),
            Self::Inventory(e) => e.kind(),
            Self::Payment(e) => e.kind(),
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        self.kind().http_status_code()
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::Inventory(e) => e.error_code(),
            Self::Payment(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the operation may succeed when retried unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// Structured details for the response body, when the error carries any.
    #[must_use]
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::Ledger(LedgerError::Unbalanced { debit, credit }) => Some(json!({
                "debit": debit,
                "credit": credit,
                "difference": debit - credit,
            })),
            Self::Ledger(LedgerError::ZeroAmount { index }
            | LedgerError::NegativeAmount { index }
            | LedgerError::BothSides { index }
            | LedgerError::AmountOutOfRange { index }) => Some(json!({ "line": index })),
            Self::Inventory(InventoryError::AmountOutOfRange { field, value })
            | Self::Payment(PaymentError::AmountOutOfRange { field, value }) => Some(json!({
                "field": field,
                "value": value,
            })),
            Self::Inventory(InventoryError::InsufficientStock(shortage)) => Some(json!({
                "itemId": shortage.item_id,
                "warehouseId": shortage.warehouse_id,
                "available": shortage.available,
                "requested": shortage.requested,
            })),
            Self::Payment(PaymentError::AmountMismatch {
                total_amount,
                operations_total,
            }) => Some(json!({
                "totalAmount": total_amount,
                "operationsTotal": operations_total,
            })),
            Self::NotFound { resource, id } => Some(json!({
                "resource": resource,
                "id": id,
            })),
            _ => None,
        }
    }
}
