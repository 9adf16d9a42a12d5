//! Stock movement routes.
//!
//! Every write returns the movement together with the stock levels it left
//! behind, the valuation entry and payment voucher it produced, and the
//! warnings for any side effect that was skipped.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockledger_core::inventory::{MovementType, PaymentMethod, ReferenceType, StockMovementInput};
use stockledger_core::payment::FundingAccount;
use stockledger_core::posting::PostingWarning;
use stockledger_db::StockMovementRepository;
use stockledger_db::entities::{item_stock, stock_movements};
use stockledger_db::repositories::{MovementOutcome, MovementRemoval};
use stockledger_shared::types::{AccountId, EntityId, ItemId, StockMovementId, WarehouseId};
use uuid::Uuid;

use super::journal_entries::JournalEntryResponse;
use super::payment_vouchers::PaymentVoucherResponse;
use crate::AppState;
use crate::error::{ApiError, ApiResult};

/// Creates the stock movement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stock-movements", post(create_movement))
        .route(
            "/stock-movements/{id}",
            get(get_movement).put(update_movement).delete(delete_movement),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating or replacing a movement.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovementRequest {
    /// Owning entity.
    pub entity_id: EntityId,
    /// Item moved.
    pub item_id: Option<ItemId>,
    /// Warehouse affected (source of a transfer).
    pub warehouse_id: Option<WarehouseId>,
    /// Destination of a transfer.
    pub to_warehouse_id: Option<WarehouseId>,
    /// Movement kind.
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    /// Quantity; signed for adjustments.
    pub quantity: Decimal,
    /// Unit cost.
    pub unit_cost: Option<Decimal>,
    /// Total cost.
    pub total_cost: Option<Decimal>,
    /// Currency of the costs.
    pub currency: Option<String>,
    /// External reference.
    pub reference: Option<String>,
    /// Business event.
    #[serde(default)]
    pub reference_type: ReferenceType,
    /// Movement date.
    pub date: NaiveDate,
    /// Free text.
    pub notes: Option<String>,
    /// COGS or adjustment account.
    pub to_account_id: Option<AccountId>,
    /// Supplier payable of a purchase.
    pub supplier_account_id: Option<AccountId>,
    /// Settlement of a purchase.
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Funding account of a cash purchase: `{cashBoxId}` or `{bankWalletId}`.
    pub payment_account: Option<FundingAccount>,
}

impl StockMovementRequest {
    /// Converts the request into a movement input.
    pub fn into_input(self) -> Result<StockMovementInput, ApiError> {
        let item_id = self
            .item_id
            .ok_or_else(|| ApiError::validation("itemId is required"))?;
        let warehouse_id = self
            .warehouse_id
            .ok_or_else(|| ApiError::validation("warehouseId is required"))?;

        Ok(StockMovementInput {
            entity_id: self.entity_id,
            item_id,
            warehouse_id,
            to_warehouse_id: self.to_warehouse_id,
            movement_type: self.movement_type,
            quantity: self.quantity,
            unit_cost: self.unit_cost,
            total_cost: self.total_cost,
            currency: self.currency.map(|c| c.to_uppercase()),
            reference: self.reference,
            reference_type: self.reference_type,
            date: self.date,
            notes: self.notes,
            to_account_id: self.to_account_id,
            supplier_account_id: self.supplier_account_id,
            payment_method: self.payment_method,
            payment_account: self.payment_account,
        })
    }
}

/// Response for a stored movement.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovementResponse {
    /// Movement ID.
    pub id: Uuid,
    /// Owning entity.
    pub entity_id: Uuid,
    /// Item moved.
    pub item_id: Uuid,
    /// Warehouse affected.
    pub warehouse_id: Uuid,
    /// Destination of a transfer.
    pub to_warehouse_id: Option<Uuid>,
    /// Movement kind.
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    /// Quantity as requested.
    pub quantity: Decimal,
    /// Unit cost as requested.
    pub unit_cost: Option<Decimal>,
    /// Total cost as requested.
    pub total_cost: Option<Decimal>,
    /// Unit cost applied.
    pub effective_unit_cost: Decimal,
    /// Value of the movement.
    pub total_value: Decimal,
    /// Currency.
    pub currency: String,
    /// Reference.
    pub reference: Option<String>,
    /// Business event.
    pub reference_type: ReferenceType,
    /// Movement date.
    pub date: NaiveDate,
    /// Notes.
    pub notes: Option<String>,
    /// COGS or adjustment account.
    pub to_account_id: Option<Uuid>,
    /// Supplier account used.
    pub supplier_account_id: Option<Uuid>,
    /// Settlement.
    pub payment_method: PaymentMethod,
    /// Paying cash box.
    pub cash_box_id: Option<Uuid>,
    /// Paying bank/wallet account.
    pub bank_wallet_id: Option<Uuid>,
    /// Linked valuation entry.
    pub journal_entry_id: Option<Uuid>,
    /// Linked payment voucher.
    pub payment_voucher_id: Option<Uuid>,
    /// Creation time.
    pub created_at: String,
    /// Last update time.
    pub updated_at: String,
}

impl From<&stock_movements::Model> for StockMovementResponse {
    fn from(m: &stock_movements::Model) -> Self {
        Self {
            id: m.id,
            entity_id: m.entity_id,
            item_id: m.item_id,
            warehouse_id: m.warehouse_id,
            to_warehouse_id: m.to_warehouse_id,
            movement_type: m.movement_type.into(),
            quantity: m.quantity,
            unit_cost: m.unit_cost,
            total_cost: m.total_cost,
            effective_unit_cost: m.effective_unit_cost,
            total_value: m.total_value,
            currency: m.currency.clone(),
            reference: m.reference.clone(),
            reference_type: m.reference_type.into(),
            date: m.movement_date,
            notes: m.notes.clone(),
            to_account_id: m.to_account_id,
            supplier_account_id: m.supplier_account_id,
            payment_method: m.payment_method.into(),
            cash_box_id: m.cash_box_id,
            bank_wallet_id: m.bank_wallet_id,
            journal_entry_id: m.journal_entry_id,
            payment_voucher_id: m.payment_voucher_id,
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

/// Stock level of the item in one warehouse.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevelResponse {
    /// Warehouse.
    pub warehouse_id: Uuid,
    /// Quantity on hand.
    pub quantity: Decimal,
    /// Moving average cost.
    pub avg_cost: Decimal,
    /// Latest purchase price.
    pub last_purchase_price: Option<Decimal>,
    /// Latest sale price.
    pub last_sale_price: Option<Decimal>,
}

impl From<&item_stock::Model> for StockLevelResponse {
    fn from(row: &item_stock::Model) -> Self {
        Self {
            warehouse_id: row.warehouse_id,
            quantity: row.quantity,
            avg_cost: row.avg_cost,
            last_purchase_price: row.last_purchase_price,
            last_sale_price: row.last_sale_price,
        }
    }
}

/// Response for a movement write.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementResultResponse {
    /// The stored movement.
    #[serde(flatten)]
    pub movement: StockMovementResponse,
    /// Stock levels after the write.
    pub stock: Vec<StockLevelResponse>,
    /// The posted valuation entry.
    pub journal_entry: Option<JournalEntryResponse>,
    /// The issued payment voucher.
    pub payment_voucher: Option<PaymentVoucherResponse>,
    /// Skipped side effects.
    pub warnings: Vec<PostingWarning>,
}

impl From<&MovementOutcome> for MovementResultResponse {
    fn from(outcome: &MovementOutcome) -> Self {
        Self {
            movement: StockMovementResponse::from(&outcome.movement),
            stock: outcome.stock.iter().map(StockLevelResponse::from).collect(),
            journal_entry: outcome.journal_entry.as_ref().map(JournalEntryResponse::from),
            payment_voucher: outcome
                .payment_voucher
                .as_ref()
                .map(PaymentVoucherResponse::from),
            warnings: outcome.warnings.clone(),
        }
    }
}

/// Response for a deleted movement.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRemovalResponse {
    /// The deleted movement.
    pub movement: StockMovementResponse,
    /// Stock levels after the reversal.
    pub stock: Vec<StockLevelResponse>,
    /// The reversing entry posted for the linked entry.
    pub reversal_entry: Option<JournalEntryResponse>,
    /// The deleted payment voucher.
    pub deleted_payment_voucher_id: Option<Uuid>,
}

impl From<&MovementRemoval> for MovementRemovalResponse {
    fn from(removed: &MovementRemoval) -> Self {
        Self {
            movement: StockMovementResponse::from(&removed.movement),
            stock: removed.stock.iter().map(StockLevelResponse::from).collect(),
            reversal_entry: removed
                .reversal
                .as_ref()
                .map(|r| JournalEntryResponse::from(&r.reversal)),
            deleted_payment_voucher_id: removed.payment_voucher.as_ref().map(|v| v.id),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

fn repository(state: &AppState) -> StockMovementRepository {
    StockMovementRepository::new(state.db.clone(), (*state.posting).clone())
}

/// POST `/stock-movements` - Record a movement.
async fn create_movement(
    State(state): State<AppState>,
    payload: Result<Json<StockMovementRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let input = payload.into_input()?;
    let entity_id = input.entity_id;

    let outcome = repository(&state).create(input).await?;
    state.account_cache.invalidate(entity_id);

    Ok((
        StatusCode::CREATED,
        Json(MovementResultResponse::from(&outcome)),
    ))
}

/// GET `/stock-movements/{id}` - Get a movement.
async fn get_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StockMovementResponse>> {
    let movement = repository(&state)
        .get(StockMovementId::from(id))
        .await?;
    Ok(Json(StockMovementResponse::from(&movement)))
}

/// PUT `/stock-movements/{id}` - Replace a movement.
async fn update_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<StockMovementRequest>, JsonRejection>,
) -> ApiResult<Json<MovementResultResponse>> {
    let Json(payload) = payload?;
    let input = payload.into_input()?;

    let outcome = repository(&state)
        .update(StockMovementId::from(id), input)
        .await?;
    for entity_id in outcome.affected_entities() {
        state.account_cache.invalidate(entity_id);
    }

    Ok(Json(MovementResultResponse::from(&outcome)))
}

/// DELETE `/stock-movements/{id}` - Delete a movement and undo its effects.
async fn delete_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MovementRemovalResponse>> {
    let removed = repository(&state)
        .delete(StockMovementId::from(id))
        .await?;
    state
        .account_cache
        .invalidate(removed.movement.entity_id.into());

    Ok(Json(MovementRemovalResponse::from(&removed)))
}
