//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - The schema migration
//! - A transaction-scoped [`UnitOfWork`]
//! - The posting repositories: account directory, balance store, journal
//!   engine, stock movements and payment vouchers

pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;
pub mod unit_of_work;

pub use error::{StoreError, StoreResult};
pub use repositories::{
    AccountRepository, BalanceStore, JournalRepository, PaymentVoucherRepository,
    StockMovementRepository,
};
pub use unit_of_work::{DbHandle, UnitOfWork};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use stockledger_shared::config::DatabaseConfig;

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}
