//! Transaction-scoped unit of work.
//!
//! Every write request runs inside exactly one [`UnitOfWork`]. Stock, journal,
//! voucher and balance writes all go through its transaction and are
//! committed once at the end. Dropping it without calling
//! [`UnitOfWork::commit`] rolls everything back.
//!
//! # Usage
//!
//! ```ignore
//! let uow = handle.begin().await?;
//! let entry = JournalRepository::post_in(uow.transaction(), &input, EntryStatus::Posted, None).await?;
//! uow.commit().await?;
//! ```

use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

/// Connection pool plus the per-transaction settings of this deployment.
#[derive(Debug, Clone)]
pub struct DbHandle {
    conn: DatabaseConnection,
    statement_timeout_ms: u64,
}

impl DbHandle {
    /// Wraps a pool.
    #[must_use]
    pub const fn new(conn: DatabaseConnection, statement_timeout_ms: u64) -> Self {
        Self {
            conn,
            statement_timeout_ms,
        }
    }

    /// The underlying pool, for plain reads outside a unit of work.
    #[must_use]
    pub const fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Begins a unit of work.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the
    /// statement timeout cannot be set.
    pub async fn begin(&self) -> Result<UnitOfWork, DbErr> {
        UnitOfWork::begin(&self.conn, self.statement_timeout_ms).await
    }
}

/// A database transaction with a bounded statement timeout.
pub struct UnitOfWork {
    txn: DatabaseTransaction,
}

impl UnitOfWork {
    /// Begins a transaction and sets `statement_timeout` for its duration.
    ///
    /// The setting uses `SET LOCAL`, so it ends with the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the
    /// timeout cannot be set.
    pub async fn begin(db: &DatabaseConnection, statement_timeout_ms: u64) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        txn.execute_unprepared(&statement_timeout_sql(statement_timeout_ms))
            .await?;
        Ok(Self { txn })
    }

    /// Returns the transaction all writes of this unit go through.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction, persisting all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

fn statement_timeout_sql(statement_timeout_ms: u64) -> String {
    format!("SET LOCAL statement_timeout = {statement_timeout_ms}")
}
