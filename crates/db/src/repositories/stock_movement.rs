//! Stock movements: the transactional posting pipeline.
//!
//! Creating a movement runs in one unit of work:
//!
//! 1. Load the item and warehouses, lock the affected stock rows
//! 2. Plan the movement in core (costs, entry, payment, warnings)
//! 3. Apply the stock deltas
//! 4. Post the valuation entry, then issue the cash payment voucher
//! 5. Insert the movement row linking all of the above
//!
//! Any failure rolls back every step. Deleting mirrors the recorded stock
//! effect, reverses the linked entry and deletes the linked voucher, so a
//! delete followed by re-creating the same request restores every balance.
//! Updating is delete plus re-create under the same ID.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, ModelTrait, QuerySelect, Set};
use serde::Serialize;
use stockledger_core::inventory::{
    InventoryError, ItemInfo, MovementType, PlanContext, StockEffect, StockMovementInput,
    StockMovementProcessor, WarehouseInfo,
};
use stockledger_core::ledger::{AccountSubtype, EntryStatus};
use stockledger_core::posting::PostingWarning;
use stockledger_shared::PostingConfig;
use stockledger_shared::types::{
    AccountId, EntityId, ItemId, JournalEntryId, PaymentVoucherId, StockMovementId, WarehouseId,
};
use tracing::{info, warn};

use super::account::{AccountRepository, account_info};
use super::balance::{BalanceStore, stock_level};
use super::journal::{JournalEntryWithLines, JournalRepository, ReversedEntry};
use super::payment_voucher::{PaymentVoucherRepository, VoucherWithOperations};
use crate::entities::{
    item_stock, items, journal_entries, payment_vouchers, stock_movements, warehouses,
};
use crate::error::{StoreError, StoreResult};
use crate::unit_of_work::DbHandle;

/// Everything a recorded movement produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementOutcome {
    /// The movement row.
    pub movement: stock_movements::Model,
    /// Stock rows after the movement, one per warehouse touched.
    pub stock: Vec<item_stock::Model>,
    /// The posted valuation entry.
    pub journal_entry: Option<JournalEntryWithLines>,
    /// The payment voucher of a cash purchase.
    pub payment_voucher: Option<VoucherWithOperations>,
    /// Side effects that were skipped.
    pub warnings: Vec<PostingWarning>,
    /// Entity of the movement this one replaced, on update.
    #[serde(skip)]
    pub replaced_entity_id: Option<EntityId>,
}

impl MovementOutcome {
    /// Entities whose balances this outcome changed.
    #[must_use]
    pub fn affected_entities(&self) -> Vec<EntityId> {
        let mut entities = vec![EntityId::from(self.movement.entity_id)];
        entities.extend(
            self.replaced_entity_id
                .filter(|replaced| !entities.contains(replaced)),
        );
        entities
    }
}

/// Everything deleting a movement undid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementRemoval {
    /// The deleted movement row.
    pub movement: stock_movements::Model,
    /// Stock rows after the reversal.
    pub stock: Vec<item_stock::Model>,
    /// The reversal of the linked entry.
    pub reversal: Option<ReversedEntry>,
    /// The deleted payment voucher.
    pub payment_voucher: Option<payment_vouchers::Model>,
}

/// Stock movement repository.
#[derive(Debug, Clone)]
pub struct StockMovementRepository {
    db: DbHandle,
    config: PostingConfig,
}

impl StockMovementRepository {
    /// Creates a new stock movement repository.
    #[must_use]
    pub const fn new(db: DbHandle, config: PostingConfig) -> Self {
        Self { db, config }
    }

    /// Records a movement with all its side effects.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid, stock is insufficient,
    /// or any side effect fails; nothing is written in that case.
    pub async fn create(&self, input: StockMovementInput) -> StoreResult<MovementOutcome> {
        let id = StockMovementId::new();

        let uow = self.db.begin().await?;
        let outcome = Self::create_in(uow.transaction(), id, &input, &self.config).await?;
        uow.commit().await?;

        log_outcome(&outcome, "Stock movement recorded");
        Ok(outcome)
    }

    /// Replaces a movement: undoes the stored one and records `input` under
    /// the same ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown movements; any other failure leaves
    /// the stored movement untouched.
    pub async fn update(
        &self,
        id: StockMovementId,
        input: StockMovementInput,
    ) -> StoreResult<MovementOutcome> {
        let uow = self.db.begin().await?;
        let txn = uow.transaction();
        let removed = Self::delete_in(txn, id, &self.config).await?;
        let mut outcome = Self::create_in(txn, id, &input, &self.config).await?;
        outcome.movement = Self::keep_created_at(txn, outcome.movement, &removed.movement).await?;
        outcome.replaced_entity_id = Some(removed.movement.entity_id.into());
        uow.commit().await?;

        log_outcome(&outcome, "Stock movement updated");
        Ok(outcome)
    }

    /// Deletes a movement and undoes its side effects.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown movements, and `InsufficientStock` if
    /// the goods it brought in have since been consumed.
    pub async fn delete(&self, id: StockMovementId) -> StoreResult<MovementRemoval> {
        let uow = self.db.begin().await?;
        let removed = Self::delete_in(uow.transaction(), id, &self.config).await?;
        uow.commit().await?;

        info!(
            movement_id = %id,
            reversal_id = ?removed.reversal.as_ref().map(|r| r.reversal.entry.id),
            voucher_id = ?removed.payment_voucher.as_ref().map(|v| v.id),
            "Stock movement deleted"
        );
        Ok(removed)
    }

    /// Gets a movement.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the movement does not exist.
    pub async fn get(&self, id: StockMovementId) -> StoreResult<stock_movements::Model> {
        Ok(stock_movements::Entity::find_by_id(id.into_inner())
            .one(self.db.conn())
            .await?
            .ok_or(InventoryError::MovementNotFound(id))?)
    }

    /// Records a movement on the caller's transaction.
    pub async fn create_in<C: ConnectionTrait>(
        conn: &C,
        id: StockMovementId,
        input: &StockMovementInput,
        config: &PostingConfig,
    ) -> StoreResult<MovementOutcome> {
        let item = items::Entity::find_by_id(input.item_id.into_inner())
            .one(conn)
            .await?
            .ok_or_else(|| StoreError::validation(format!("Item {} not found", input.item_id)))?;
        let warehouse = find_warehouse(conn, input.warehouse_id).await?;
        let to_warehouse = match input.to_warehouse_id {
            Some(to) if input.movement_type == MovementType::Transfer => {
                Some(find_warehouse(conn, to).await?)
            }
            _ => None,
        };

        let item_info = ItemInfo {
            id: item.id.into(),
            entity_id: item.entity_id.into(),
            name: item.name.clone(),
            stock_account_id: item.stock_account_id.map(Into::into),
        };

        // Lock every affected row up front, in one ordered pass.
        let mut affected = vec![input.warehouse_id];
        affected.extend(to_warehouse.as_ref().map(|w| w.id));
        let locked = BalanceStore::lock_stock(conn, input.item_id, &affected).await?;
        let source_stock = locked
            .get(&input.warehouse_id)
            .map(stock_level)
            .unwrap_or_default();

        let supplier = match input.supplier_account_id {
            Some(id) => AccountRepository::find_in(conn, id)
                .await?
                .map(|account| account_info(&account)),
            None => None,
        };
        let fallback_supplier = if input.supplier_account_id.is_none() && config.supplier_fallback
        {
            AccountRepository::first_by_subtype_in(conn, AccountSubtype::Supplier, input.entity_id)
                .await?
                .map(|account| AccountId::from(account.id))
        } else {
            None
        };

        let ctx = PlanContext {
            item: &item_info,
            warehouse: &warehouse,
            to_warehouse: to_warehouse.as_ref(),
            source_stock: &source_stock,
            supplier: supplier.as_ref(),
            fallback_supplier,
        };
        let plan = StockMovementProcessor::plan(input, &ctx, config)?;

        let stock = BalanceStore::apply_deltas(
            conn,
            input.item_id,
            &plan.effect.deltas(),
            config.allow_negative_stock,
        )
        .await?;

        let journal_entry = match &plan.journal {
            Some(entry) => {
                Some(JournalRepository::post_in(conn, entry, EntryStatus::Posted, None).await?)
            }
            None => None,
        };

        let payment_voucher = match &plan.payment {
            Some(payment) => {
                let voucher =
                    payment.voucher(input.entity_id, input.date, input.reference.clone());
                Some(PaymentVoucherRepository::issue_in(conn, &voucher).await?)
            }
            None => None,
        };

        let funding = input.payment_account.filter(|_| plan.payment.is_some());
        let now = Utc::now().into();
        let movement = stock_movements::ActiveModel {
            id: Set(id.into_inner()),
            entity_id: Set(input.entity_id.into_inner()),
            item_id: Set(input.item_id.into_inner()),
            warehouse_id: Set(input.warehouse_id.into_inner()),
            to_warehouse_id: Set(plan.effect.to_warehouse_id.map(WarehouseId::into_inner)),
            movement_type: Set(input.movement_type.into()),
            quantity: Set(input.quantity),
            unit_cost: Set(input.unit_cost),
            total_cost: Set(input.total_cost),
            effective_unit_cost: Set(plan.effect.unit_cost),
            total_value: Set(plan.total_value),
            currency: Set(plan.currency.clone()),
            reference: Set(input.reference.clone()),
            reference_type: Set(input.reference_type.into()),
            movement_date: Set(input.date),
            notes: Set(input.notes.clone()),
            to_account_id: Set(input.to_account_id.map(AccountId::into_inner)),
            supplier_account_id: Set(plan
                .payment
                .as_ref()
                .map(|p| p.supplier_account_id)
                .or(input.supplier_account_id)
                .map(AccountId::into_inner)),
            payment_method: Set(input.payment_method.into()),
            cash_box_id: Set(funding.and_then(|f| f.cash_box_id()).map(Into::into)),
            bank_wallet_id: Set(funding.and_then(|f| f.bank_wallet_id()).map(Into::into)),
            journal_entry_id: Set(journal_entry.as_ref().map(|e| e.entry.id)),
            payment_voucher_id: Set(payment_voucher.as_ref().map(|v| v.voucher.id)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await?;

        Ok(MovementOutcome {
            movement,
            stock,
            journal_entry,
            payment_voucher,
            warnings: plan.warnings,
            replaced_entity_id: None,
        })
    }

    /// Deletes a movement on the caller's transaction.
    ///
    /// The recorded effect is mirrored exactly, using the stored unit cost,
    /// so current averages are never used to recompute it.
    pub async fn delete_in<C: ConnectionTrait>(
        conn: &C,
        id: StockMovementId,
        config: &PostingConfig,
    ) -> StoreResult<MovementRemoval> {
        let movement = stock_movements::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(conn)
            .await?
            .ok_or(InventoryError::MovementNotFound(id))?;

        let effect = recorded_effect(&movement);
        let stock = BalanceStore::apply_deltas(
            conn,
            ItemId::from(movement.item_id),
            &effect.reversal_deltas(),
            config.allow_negative_stock,
        )
        .await?;

        let reversal = match movement.journal_entry_id {
            Some(entry_id) => Self::reverse_linked_entry(conn, entry_id.into(), id).await?,
            None => None,
        };

        movement.clone().delete(conn).await?;

        let payment_voucher = match movement.payment_voucher_id {
            Some(voucher_id) => Some(
                PaymentVoucherRepository::delete_in(conn, PaymentVoucherId::from(voucher_id))
                    .await?,
            ),
            None => None,
        };

        Ok(MovementRemoval {
            movement,
            stock,
            reversal,
            payment_voucher,
        })
    }

    /// Reverses the entry a movement posted, unless it was already voided.
    async fn reverse_linked_entry<C: ConnectionTrait>(
        conn: &C,
        entry_id: JournalEntryId,
        movement_id: StockMovementId,
    ) -> StoreResult<Option<ReversedEntry>> {
        let entry = journal_entries::Entity::find_by_id(entry_id.into_inner())
            .one(conn)
            .await?;
        let Some(entry) = entry else {
            return Ok(None);
        };
        if EntryStatus::from(entry.status) != EntryStatus::Posted {
            warn!(
                entry_id = %entry_id,
                movement_id = %movement_id,
                "Linked journal entry is no longer posted; nothing to reverse"
            );
            return Ok(None);
        }

        let reason = format!("Stock movement {movement_id} deleted");
        let reversed =
            JournalRepository::reverse_in(conn, entry_id, Utc::now().date_naive(), &reason)
                .await?;
        Ok(Some(reversed))
    }

    async fn keep_created_at<C: ConnectionTrait>(
        conn: &C,
        movement: stock_movements::Model,
        previous: &stock_movements::Model,
    ) -> StoreResult<stock_movements::Model> {
        let mut active: stock_movements::ActiveModel = movement.into();
        active.created_at = Set(previous.created_at);
        Ok(active.update(conn).await?)
    }
}

async fn find_warehouse<C: ConnectionTrait>(
    conn: &C,
    id: WarehouseId,
) -> StoreResult<WarehouseInfo> {
    let warehouse = warehouses::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or_else(|| StoreError::validation(format!("Warehouse {id} not found")))?;
    Ok(WarehouseInfo {
        id,
        entity_id: warehouse.entity_id.into(),
    })
}

/// The stock effect a stored movement applied.
#[must_use]
pub fn recorded_effect(movement: &stock_movements::Model) -> StockEffect {
    let movement_type: MovementType = movement.movement_type.into();
    StockEffect {
        movement_type,
        reference_type: movement.reference_type.into(),
        quantity: movement.quantity,
        warehouse_id: movement.warehouse_id.into(),
        to_warehouse_id: movement
            .to_warehouse_id
            .filter(|_| movement_type == MovementType::Transfer)
            .map(Into::into),
        unit_cost: movement.effective_unit_cost,
    }
}

fn log_outcome(outcome: &MovementOutcome, message: &str) {
    for warning in &outcome.warnings {
        warn!(
            movement_id = %outcome.movement.id,
            code = ?warning.code,
            "{}",
            warning.message
        );
    }
    info!(
        movement_id = %outcome.movement.id,
        entry_id = ?outcome.journal_entry.as_ref().map(|e| e.entry.id),
        voucher_id = ?outcome.payment_voucher.as_ref().map(|v| v.voucher.id),
        warnings = outcome.warnings.len(),
        "{message}"
    );
}
