//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Each write operation has a `*_in` form taking the caller's transaction, so
//! a stock movement can post its entry and issue its voucher in one unit of
//! work.

pub mod account;
pub mod balance;
pub mod journal;
pub mod payment_voucher;
pub mod stock_movement;

pub use account::AccountRepository;
pub use balance::BalanceStore;
pub use journal::{JournalEntryWithLines, JournalRepository, ReversedEntry};
pub use payment_voucher::{PaymentVoucherRepository, VoucherWithOperations};
pub use stock_movement::{MovementOutcome, MovementRemoval, StockMovementRepository};
