//! Ledger error types for validation and state errors.

use rust_decimal::Decimal;
use stockledger_shared::types::{AccountId, EntityId, JournalEntryId};
use thiserror::Error;

use super::types::EntryStatus;
use crate::posting::ErrorKind;

/// Errors that can occur while building, posting or voiding journal entries.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry has no lines.
    #[error("Journal entry must have at least one line")]
    EmptyEntry,

    /// Line has neither a debit nor a credit.
    #[error("Line {index} must have a debit or a credit amount")]
    ZeroAmount {
        /// Zero-based line index.
        index: usize,
    },

    /// Line carries a negative amount.
    #[error("Line {index} has a negative amount")]
    NegativeAmount {
        /// Zero-based line index.
        index: usize,
    },

    /// Line carries both a debit and a credit.
    #[error("Line {index} must specify either debit or credit, not both")]
    BothSides {
        /// Zero-based line index.
        index: usize,
    },

    /// Amount exceeds the stored range or precision.
    #[error("Line {index} amount exceeds 16 integer digits or 4 decimal places")]
    AmountOutOfRange {
        /// Zero-based line index.
        index: usize,
    },

    /// Debits and credits do not agree within tolerance.
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Group accounts never receive postings.
    #[error("Account {0} is a group account and cannot be posted to")]
    GroupAccount(AccountId),

    /// Account belongs to another entity.
    #[error("Account {account_id} does not belong to entity {entity_id}")]
    EntityMismatch {
        /// The account ID.
        account_id: AccountId,
        /// The entity of the entry.
        entity_id: EntityId,
    },

    /// Account does not accept the line currency.
    #[error("Account {account_id} does not accept currency {currency}")]
    CurrencyNotAllowed {
        /// The account ID.
        account_id: AccountId,
        /// The rejected currency.
        currency: String,
    },

    // ========== Entry State Errors ==========
    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    /// Posted entries are never cancelled in place.
    #[error("Journal entry {0} is posted; reverse it instead of cancelling")]
    CannotCancelPosted(JournalEntryId),

    /// The requested transition is not valid from the current status.
    #[error("Journal entry {id} is {status:?}; cannot {action}")]
    InvalidTransition {
        /// The entry ID.
        id: JournalEntryId,
        /// Current status.
        status: EntryStatus,
        /// The rejected action.
        action: &'static str,
    },
}

impl LedgerError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unbalanced { .. } => ErrorKind::Unbalanced,
            Self::AccountNotFound(_) | Self::EntryNotFound(_) => ErrorKind::NotFound,
            Self::EmptyEntry
            | Self::ZeroAmount { .. }
            | Self::NegativeAmount { .. }
            | Self::BothSides { .. }
            | Self::AmountOutOfRange { .. }
            | Self::GroupAccount(_)
            | Self::EntityMismatch { .. }
            | Self::CurrencyNotAllowed { .. }
            | Self::CannotCancelPosted(_)
            | Self::InvalidTransition { .. } => ErrorKind::Validation,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyEntry => "EMPTY_ENTRY",
            Self::ZeroAmount { .. } => "ZERO_AMOUNT",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::BothSides { .. } => "INVALID_ENTRY_SIDE",
            Self::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::GroupAccount(_) => "GROUP_ACCOUNT",
            Self::EntityMismatch { .. } => "ACCOUNT_ENTITY_MISMATCH",
            Self::CurrencyNotAllowed { .. } => "CURRENCY_NOT_ALLOWED",
            Self::EntryNotFound(_) => "JOURNAL_ENTRY_NOT_FOUND",
            Self::CannotCancelPosted(_) => "CANNOT_CANCEL_POSTED",
            Self::InvalidTransition { .. } => "INVALID_STATUS_TRANSITION",
        }
    }
}
