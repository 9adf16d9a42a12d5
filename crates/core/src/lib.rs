//! Core business logic for Stockledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Every rule of the posting engine lives here; the `db` crate only loads
//! collaborator rows, applies the plans computed here and persists them.
//!
//! # Modules
//!
//! - `ledger` - Double-entry journal validation, balances and reversal
//! - `inventory` - Stock levels, movement planning and movement reversal
//! - `payment` - Payment voucher validation
//! - `posting` - Error taxonomy and best-effort warnings shared by all of the above

pub mod inventory;
pub mod ledger;
pub mod payment;
pub mod posting;
