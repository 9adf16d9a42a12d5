//! Warnings for best-effort side effects that were skipped.
//!
//! A degraded path never fails the request (unless strict linkage is on);
//! it is logged and reported back to the caller in the response.

use serde::Serialize;

/// Machine-readable warning codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    /// Item has no stock account; no valuation entry was posted.
    MissingStockAccount,
    /// No supplier account could be resolved; no purchase entry was posted.
    MissingSupplierAccount,
    /// The supplier account was resolved by subtype fallback.
    SupplierFallback,
    /// An outbound or adjustment had no counter account; no entry was posted.
    MissingCounterAccount,
    /// Cash payment was requested but no voucher was issued.
    PaymentSkipped,
    /// The movement has no cost, so no valuation entry was posted.
    ZeroValue,
}

/// A skipped side effect, reported alongside a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostingWarning {
    /// Warning code.
    pub code: WarningCode,
    /// Human-readable explanation.
    pub message: String,
}

impl PostingWarning {
    /// Creates a warning.
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
