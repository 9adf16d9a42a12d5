//! Payment vouchers: cash receipts and disbursements.
//!
//! Issuing a voucher validates it completely, then inserts the header and
//! its operations and moves the funding balance (`+total` for `in`,
//! `-total` for `out`). Deleting applies the opposite delta. Vouchers post
//! no journal entry of their own.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use stockledger_core::payment::{
    FundingAccount, IssueVoucherInput, PaymentError, VoucherService, VoucherType,
};
use stockledger_shared::types::{AccountId, PaymentVoucherId};
use tracing::info;
use uuid::Uuid;

use super::account::{AccountRepository, account_info};
use super::balance::BalanceStore;
use crate::entities::{payment_voucher_operations, payment_vouchers, stock_movements};
use crate::error::{StoreError, StoreResult};
use crate::unit_of_work::DbHandle;

/// A voucher with its operations in line order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoucherWithOperations {
    /// Voucher header.
    pub voucher: payment_vouchers::Model,
    /// Allocation lines.
    pub operations: Vec<payment_voucher_operations::Model>,
}

/// Payment voucher repository.
#[derive(Debug, Clone)]
pub struct PaymentVoucherRepository {
    db: DbHandle,
}

impl PaymentVoucherRepository {
    /// Creates a new payment voucher repository.
    #[must_use]
    pub const fn new(db: DbHandle) -> Self {
        Self { db }
    }

    /// Issues a voucher in its own unit of work.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher is invalid; no balance is touched then.
    pub async fn issue(&self, input: IssueVoucherInput) -> StoreResult<VoucherWithOperations> {
        let uow = self.db.begin().await?;
        let voucher = Self::issue_in(uow.transaction(), &input).await?;
        uow.commit().await?;

        info!(
            voucher_id = %voucher.voucher.id,
            funding = %input.funding,
            total = %input.total_amount,
            "Payment voucher issued"
        );
        Ok(voucher)
    }

    /// Deletes a voucher and restores the funding balance.
    ///
    /// Vouchers created by a cash purchase belong to their stock movement
    /// and are removed with it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown vouchers and a validation error for
    /// vouchers owned by a stock movement.
    pub async fn delete(&self, id: PaymentVoucherId) -> StoreResult<()> {
        let uow = self.db.begin().await?;
        let txn = uow.transaction();

        let owners = stock_movements::Entity::find()
            .filter(stock_movements::Column::PaymentVoucherId.eq(id.into_inner()))
            .count(txn)
            .await?;
        if owners > 0 {
            return Err(StoreError::validation(format!(
                "Payment voucher {id} belongs to a stock movement; delete the movement instead"
            )));
        }

        Self::delete_in(txn, id).await?;
        uow.commit().await?;

        info!(voucher_id = %id, "Payment voucher deleted");
        Ok(())
    }

    /// Gets a voucher with its operations.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the voucher does not exist.
    pub async fn get(&self, id: PaymentVoucherId) -> StoreResult<VoucherWithOperations> {
        let conn = self.db.conn();
        let voucher = payment_vouchers::Entity::find_by_id(id.into_inner())
            .one(conn)
            .await?
            .ok_or(PaymentError::VoucherNotFound(id))?;
        let operations = Self::operations_of(conn, id).await?;
        Ok(VoucherWithOperations {
            voucher,
            operations,
        })
    }

    /// Issues a voucher on the caller's transaction.
    pub async fn issue_in<C: ConnectionTrait>(
        conn: &C,
        input: &IssueVoucherInput,
    ) -> StoreResult<VoucherWithOperations> {
        let funding = BalanceStore::lock_funding(conn, input.funding).await?;

        let ids: Vec<AccountId> = input
            .operations
            .iter()
            .flat_map(|op| std::iter::once(op.chart_account_id).chain(op.analytical_account_id))
            .collect();
        let accounts = AccountRepository::load_accounts(conn, &ids).await?;
        let resolved =
            VoucherService::validate(input, &funding, |id| accounts.get(&id).map(account_info))?;

        let voucher = payment_vouchers::ActiveModel {
            id: Set(Uuid::now_v7()),
            entity_id: Set(input.entity_id.into_inner()),
            voucher_type: Set(input.voucher_type.into()),
            cash_box_id: Set(input.funding.cash_box_id().map(Into::into)),
            bank_wallet_id: Set(input.funding.bank_wallet_id().map(Into::into)),
            voucher_date: Set(input.date),
            currency: Set(input.currency.to_uppercase()),
            exchange_rate: Set(input.exchange_rate),
            total_amount: Set(input.total_amount),
            reference: Set(input.reference.clone()),
            created_at: Set(Utc::now().into()),
        }
        .insert(conn)
        .await?;

        let mut operations = Vec::with_capacity(resolved.len());
        for (line_no, op) in (1..).zip(resolved) {
            let row = payment_voucher_operations::ActiveModel {
                id: Set(Uuid::now_v7()),
                voucher_id: Set(voucher.id),
                line_no: Set(line_no),
                account_type: Set(op.account_type.into()),
                account_subtype: Set(op.account_subtype.map(Into::into)),
                chart_account_id: Set(op.chart_account_id.into_inner()),
                analytical_account_id: Set(op.analytical_account_id.map(AccountId::into_inner)),
                amount: Set(op.amount),
                description: Set(op.description),
            }
            .insert(conn)
            .await?;
            operations.push(row);
        }

        BalanceStore::adjust_funding(
            conn,
            input.funding,
            input.voucher_type.funding_delta(input.total_amount),
        )
        .await?;

        Ok(VoucherWithOperations {
            voucher,
            operations,
        })
    }

    /// Deletes a voucher on the caller's transaction, reverting its funding
    /// balance effect. Returns the deleted header.
    pub async fn delete_in<C: ConnectionTrait>(
        conn: &C,
        id: PaymentVoucherId,
    ) -> StoreResult<payment_vouchers::Model> {
        let voucher = payment_vouchers::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(conn)
            .await?
            .ok_or(PaymentError::VoucherNotFound(id))?;

        let funding = FundingAccount::from_parts(
            voucher.cash_box_id.map(Into::into),
            voucher.bank_wallet_id.map(Into::into),
        )?;
        let voucher_type: VoucherType = voucher.voucher_type.into();
        BalanceStore::adjust_funding(conn, funding, -voucher_type.funding_delta(voucher.total_amount))
            .await?;

        payment_voucher_operations::Entity::delete_many()
            .filter(payment_voucher_operations::Column::VoucherId.eq(voucher.id))
            .exec(conn)
            .await?;
        voucher.clone().delete(conn).await?;

        Ok(voucher)
    }

    async fn operations_of<C: ConnectionTrait>(
        conn: &C,
        id: PaymentVoucherId,
    ) -> StoreResult<Vec<payment_voucher_operations::Model>> {
        Ok(payment_voucher_operations::Entity::find()
            .filter(payment_voucher_operations::Column::VoucherId.eq(id.into_inner()))
            .order_by_asc(payment_voucher_operations::Column::LineNo)
            .all(conn)
            .await?)
    }
}
