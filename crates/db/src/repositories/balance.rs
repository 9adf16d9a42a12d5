//! Balance store: per-warehouse stock levels and funding account balances.
//!
//! Every function runs on the caller's transaction. Stock rows are locked
//! with `SELECT ... FOR UPDATE` in ascending warehouse order before they are
//! changed; a missing row is inserted, and a concurrent insert of the same
//! `(item_id, warehouse_id)` surfaces as a unique violation, which is
//! classified as a retryable `Conflict`.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use stockledger_core::inventory::{StockDelta, StockLevel};
use stockledger_core::payment::{FundingAccount, FundingInfo, PaymentError};
use stockledger_shared::types::{BankWalletId, CashBoxId, ItemId, WarehouseId};
use uuid::Uuid;

use crate::entities::{banks_wallets, cash_boxes, currency_list, item_stock};
use crate::error::{StoreError, StoreResult};

/// Stateless balance store operating on a transaction.
pub struct BalanceStore;

impl BalanceStore {
    /// Locks the stock rows of an item in the given warehouses.
    ///
    /// Rows that do not exist yet are simply absent from the result.
    pub async fn lock_stock<C: ConnectionTrait>(
        conn: &C,
        item_id: ItemId,
        warehouse_ids: &[WarehouseId],
    ) -> StoreResult<HashMap<WarehouseId, item_stock::Model>> {
        let mut ids: Vec<Uuid> = warehouse_ids.iter().map(|id| id.into_inner()).collect();
        ids.sort_unstable();
        ids.dedup();

        let rows = item_stock::Entity::find()
            .filter(item_stock::Column::ItemId.eq(item_id.into_inner()))
            .filter(item_stock::Column::WarehouseId.is_in(ids))
            .order_by_asc(item_stock::Column::WarehouseId)
            .lock_exclusive()
            .all(conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (WarehouseId::from(row.warehouse_id), row))
            .collect())
    }

    /// Applies one delta to a (locked) stock row, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientStock` if the delta would take the quantity below
    /// zero and negative stock is not allowed.
    pub async fn adjust_stock<C: ConnectionTrait>(
        conn: &C,
        item_id: ItemId,
        delta: &StockDelta,
        current: Option<&item_stock::Model>,
        allow_negative: bool,
    ) -> StoreResult<item_stock::Model> {
        let level = current.map(stock_level);
        let next = StockLevel::apply_checked(level.as_ref(), delta, item_id, allow_negative)?;
        let now = Utc::now().into();

        let row = match current {
            Some(row) => {
                let mut active: item_stock::ActiveModel = row.clone().into();
                active.quantity = Set(next.quantity);
                active.avg_cost = Set(next.avg_cost);
                active.last_purchase_price = Set(next.last_purchase_price);
                active.last_sale_price = Set(next.last_sale_price);
                active.updated_at = Set(now);
                active.update(conn).await?
            }
            None => {
                item_stock::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    item_id: Set(item_id.into_inner()),
                    warehouse_id: Set(delta.warehouse_id.into_inner()),
                    quantity: Set(next.quantity),
                    avg_cost: Set(next.avg_cost),
                    last_purchase_price: Set(next.last_purchase_price),
                    last_sale_price: Set(next.last_sale_price),
                    updated_at: Set(now),
                }
                .insert(conn)
                .await?
            }
        };

        Ok(row)
    }

    /// Locks the affected rows and applies every delta in order.
    ///
    /// Returns the final row of each warehouse touched.
    pub async fn apply_deltas<C: ConnectionTrait>(
        conn: &C,
        item_id: ItemId,
        deltas: &[StockDelta],
        allow_negative: bool,
    ) -> StoreResult<Vec<item_stock::Model>> {
        let warehouses: Vec<WarehouseId> = deltas.iter().map(|d| d.warehouse_id).collect();
        let mut rows = Self::lock_stock(conn, item_id, &warehouses).await?;

        for delta in deltas {
            let updated = Self::adjust_stock(
                conn,
                item_id,
                delta,
                rows.get(&delta.warehouse_id),
                allow_negative,
            )
            .await?;
            rows.insert(delta.warehouse_id, updated);
        }

        let mut touched: Vec<item_stock::Model> = rows.into_values().collect();
        touched.sort_by_key(|row| row.warehouse_id);
        Ok(touched)
    }

    /// Reads the stock level of an item in one warehouse.
    pub async fn stock_level<C: ConnectionTrait>(
        conn: &C,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> StoreResult<Option<item_stock::Model>> {
        Ok(item_stock::Entity::find()
            .filter(item_stock::Column::ItemId.eq(item_id.into_inner()))
            .filter(item_stock::Column::WarehouseId.eq(warehouse_id.into_inner()))
            .one(conn)
            .await?)
    }

    /// Adds `delta` to a cash box balance and returns the new balance.
    pub async fn adjust_cash_box<C: ConnectionTrait>(
        conn: &C,
        id: CashBoxId,
        delta: Decimal,
    ) -> StoreResult<Decimal> {
        let updated = cash_boxes::Entity::update_many()
            .col_expr(
                cash_boxes::Column::Balance,
                Expr::col(cash_boxes::Column::Balance).add(delta),
            )
            .col_expr(cash_boxes::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(cash_boxes::Column::Id.eq(id.into_inner()))
            .exec_with_returning(conn)
            .await?;

        updated
            .first()
            .map(|row| row.balance)
            .ok_or_else(|| PaymentError::FundingNotFound(FundingAccount::CashBox(id)).into())
    }

    /// Adds `delta` to a bank/wallet balance and returns the new balance.
    pub async fn adjust_bank_wallet<C: ConnectionTrait>(
        conn: &C,
        id: BankWalletId,
        delta: Decimal,
    ) -> StoreResult<Decimal> {
        let updated = banks_wallets::Entity::update_many()
            .col_expr(
                banks_wallets::Column::Balance,
                Expr::col(banks_wallets::Column::Balance).add(delta),
            )
            .col_expr(banks_wallets::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(banks_wallets::Column::Id.eq(id.into_inner()))
            .exec_with_returning(conn)
            .await?;

        updated
            .first()
            .map(|row| row.balance)
            .ok_or_else(|| PaymentError::FundingNotFound(FundingAccount::BankWallet(id)).into())
    }

    /// Adds `delta` to whichever funding account is given.
    pub async fn adjust_funding<C: ConnectionTrait>(
        conn: &C,
        funding: FundingAccount,
        delta: Decimal,
    ) -> StoreResult<Decimal> {
        match funding {
            FundingAccount::CashBox(id) => Self::adjust_cash_box(conn, id, delta).await,
            FundingAccount::BankWallet(id) => Self::adjust_bank_wallet(conn, id, delta).await,
        }
    }

    /// Locks a funding account row and returns what voucher validation needs.
    pub async fn lock_funding<C: ConnectionTrait>(
        conn: &C,
        funding: FundingAccount,
    ) -> StoreResult<FundingInfo> {
        let not_found = || StoreError::from(PaymentError::FundingNotFound(funding));
        match funding {
            FundingAccount::CashBox(id) => {
                let row = cash_boxes::Entity::find_by_id(id.into_inner())
                    .lock_exclusive()
                    .one(conn)
                    .await?
                    .ok_or_else(not_found)?;
                Ok(FundingInfo {
                    account: funding,
                    entity_id: row.entity_id.into(),
                    currencies: currency_list(&row.currencies),
                })
            }
            FundingAccount::BankWallet(id) => {
                let row = banks_wallets::Entity::find_by_id(id.into_inner())
                    .lock_exclusive()
                    .one(conn)
                    .await?
                    .ok_or_else(not_found)?;
                Ok(FundingInfo {
                    account: funding,
                    entity_id: row.entity_id.into(),
                    currencies: currency_list(&row.currencies),
                })
            }
        }
    }
}

/// Converts a stock row into a level.
#[must_use]
pub fn stock_level(row: &item_stock::Model) -> StockLevel {
    StockLevel {
        quantity: row.quantity,
        avg_cost: row.avg_cost,
        last_purchase_price: row.last_purchase_price,
        last_sale_price: row.last_sale_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_stock_level_from_row() {
        let row = item_stock::Model {
            id: Uuid::now_v7(),
            item_id: Uuid::now_v7(),
            warehouse_id: Uuid::now_v7(),
            quantity: dec!(4000),
            avg_cost: dec!(500),
            last_purchase_price: Some(dec!(500)),
            last_sale_price: None,
            updated_at: Utc::now().into(),
        };

        let level = stock_level(&row);
        assert_eq!(level.quantity, dec!(4000));
        assert_eq!(level.avg_cost, dec!(500));
        assert_eq!(level.last_purchase_price, Some(dec!(500)));
    }
}
