//! Double-entry bookkeeping logic.
//!
//! This module implements the journal side of the posting engine:
//! - Chart-of-accounts classification and journal entry types
//! - Balance sign rules and running balances
//! - Structural validation (one side per line, debits = credits)
//! - Account resolution for postings
//! - Reversing entries for posted journal entries
//! - Read-through caching of account lists

pub mod balance;
pub mod cache;
pub mod error;
pub mod reversal;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use balance::{NormalBalance, RunningBalance};
pub use cache::AccountCache;
pub use error::LedgerError;
pub use reversal::{ReversalInput, ReversalService};
pub use service::LedgerService;
pub use types::{
    AccountInfo, AccountSubtype, AccountSummary, AccountType, EntryKind, EntrySide, EntryStatus,
    EntryTotals, JournalLineInput, PostEntryInput, ResolvedLine,
};
pub use validation::validate_lines;
