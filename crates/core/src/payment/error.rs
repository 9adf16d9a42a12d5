//! Payment voucher error types.

use rust_decimal::Decimal;
use stockledger_shared::types::{AccountId, PaymentVoucherId};
use thiserror::Error;

use super::types::FundingAccount;
use crate::posting::ErrorKind;

/// Errors that can occur while issuing or deleting vouchers.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Voucher has no operations.
    #[error("Payment voucher must have at least one operation")]
    EmptyOperations,

    /// Operation amount is zero or negative.
    #[error("Operation {index} amount must be positive")]
    InvalidOperationAmount {
        /// Zero-based operation index.
        index: usize,
    },

    /// Voucher total is zero or negative.
    #[error("Voucher total must be positive, got {0}")]
    InvalidTotal(Decimal),

    /// Exchange rate is zero or negative.
    #[error("Exchange rate must be positive, got {0}")]
    InvalidExchangeRate(Decimal),

    /// An amount or rate exceeds the stored range or precision.
    #[error("{field} {value} exceeds the stored range or precision")]
    AmountOutOfRange {
        /// Offending field.
        field: &'static str,
        /// Rejected value.
        value: Decimal,
    },

    /// Operations do not sum to the voucher total.
    #[error("Operations total {operations_total} does not match voucher total {total_amount}")]
    AmountMismatch {
        /// Declared voucher total.
        total_amount: Decimal,
        /// Sum of operation amounts.
        operations_total: Decimal,
    },

    /// Both a cash box and a bank/wallet were given.
    #[error("Voucher must use either a cash box or a bank/wallet account, not both")]
    AmbiguousFunding,

    /// Neither a cash box nor a bank/wallet was given.
    #[error("Voucher requires a cash box or a bank/wallet account")]
    MissingFunding,

    /// Funding account not found.
    #[error("Funding account not found: {0}")]
    FundingNotFound(FundingAccount),

    /// Funding account belongs to another entity.
    #[error("Funding account {0} does not belong to the voucher's entity")]
    FundingEntityMismatch(FundingAccount),

    /// Funding account does not hold the voucher currency.
    #[error("Funding account {funding} does not accept currency {currency}")]
    CurrencyNotAllowed {
        /// The funding account.
        funding: FundingAccount,
        /// The rejected currency.
        currency: String,
    },

    /// Operation references an unknown chart account.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Operation references a group account or one of another entity.
    #[error("Account {0} cannot receive voucher allocations")]
    InvalidAccount(AccountId),

    /// Voucher not found.
    #[error("Payment voucher not found: {0}")]
    VoucherNotFound(PaymentVoucherId),
}

impl PaymentError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AmountMismatch { .. } => ErrorKind::AmountMismatch,
            Self::FundingNotFound(_) | Self::AccountNotFound(_) | Self::VoucherNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::EmptyOperations
            | Self::InvalidOperationAmount { .. }
            | Self::InvalidTotal(_)
            | Self::InvalidExchangeRate(_)
            | Self::AmountOutOfRange { .. }
            | Self::AmbiguousFunding
            | Self::MissingFunding
            | Self::FundingEntityMismatch(_)
            | Self::CurrencyNotAllowed { .. }
            | Self::InvalidAccount(_) => ErrorKind::Validation,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyOperations => "EMPTY_OPERATIONS",
            Self::InvalidOperationAmount { .. } => "INVALID_OPERATION_AMOUNT",
            Self::InvalidTotal(_) => "INVALID_TOTAL",
            Self::InvalidExchangeRate(_) => "INVALID_EXCHANGE_RATE",
            Self::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            Self::AmountMismatch { .. } => "AMOUNT_MISMATCH",
            Self::AmbiguousFunding => "AMBIGUOUS_FUNDING_ACCOUNT",
            Self::MissingFunding => "MISSING_FUNDING_ACCOUNT",
            Self::FundingNotFound(_) => "FUNDING_ACCOUNT_NOT_FOUND",
            Self::FundingEntityMismatch(_) => "FUNDING_ENTITY_MISMATCH",
            Self::CurrencyNotAllowed { .. } => "CURRENCY_NOT_ALLOWED",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::InvalidAccount(_) => "INVALID_ACCOUNT",
            Self::VoucherNotFound(_) => "PAYMENT_VOUCHER_NOT_FOUND",
        }
    }
}
