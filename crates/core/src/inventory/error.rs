//! Inventory error types.

use rust_decimal::Decimal;
use serde::Serialize;
use stockledger_shared::types::{AccountId, ItemId, StockMovementId, WarehouseId};
use thiserror::Error;

use super::types::MovementType;
use crate::posting::ErrorKind;

/// Details of a rejected stock decrement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsufficientStock {
    /// The item.
    pub item_id: ItemId,
    /// The warehouse.
    pub warehouse_id: WarehouseId,
    /// Quantity on hand before the movement.
    pub available: Decimal,
    /// Quantity the movement tried to take.
    pub requested: Decimal,
}

/// Errors that can occur while planning or applying stock movements.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Quantity is zero, or negative for an unsigned movement.
    #[error("Invalid quantity {quantity} for {movement_type:?} movement")]
    InvalidQuantity {
        /// Movement kind.
        movement_type: MovementType,
        /// Rejected quantity.
        quantity: Decimal,
    },

    /// Unit or total cost is negative.
    #[error("Cost must not be negative: {0}")]
    NegativeCost(Decimal),

    /// A quantity or value exceeds the stored range or precision.
    #[error("{field} {value} exceeds the stored range or precision")]
    AmountOutOfRange {
        /// Offending field.
        field: &'static str,
        /// Rejected or computed value.
        value: Decimal,
    },

    /// Transfer without a destination warehouse.
    #[error("Transfer requires a destination warehouse")]
    MissingDestination,

    /// Transfer into the source warehouse.
    #[error("Transfer source and destination warehouse are the same")]
    SameWarehouse,

    /// Item or warehouse belongs to another entity.
    #[error("{resource} {id} does not belong to the movement's entity")]
    EntityMismatch {
        /// Kind of record.
        resource: &'static str,
        /// Record id.
        id: String,
    },

    /// Supplier account is unknown, foreign, a group, or not a supplier.
    #[error("Account {0} is not a supplier account of the movement's entity")]
    InvalidSupplierAccount(AccountId),

    /// Decrement would take stock below zero.
    #[error(
        "Insufficient stock for item {} in warehouse {}: available {}, requested {}",
        .0.item_id, .0.warehouse_id, .0.available, .0.requested
    )]
    InsufficientStock(InsufficientStock),

    /// A linked journal entry or payment could not be derived under strict linkage.
    #[error("Linkage required: {0}")]
    LinkageRequired(String),

    /// Movement not found.
    #[error("Stock movement not found: {0}")]
    MovementNotFound(StockMovementId),
}

impl InventoryError {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientStock(_) => ErrorKind::InsufficientStock,
            Self::MovementNotFound(_) => ErrorKind::NotFound,
            Self::InvalidQuantity { .. }
            | Self::NegativeCost(_)
            | Self::AmountOutOfRange { .. }
            | Self::MissingDestination
            | Self::SameWarehouse
            | Self::EntityMismatch { .. }
            | Self::InvalidSupplierAccount(_)
            | Self::LinkageRequired(_) => ErrorKind::Validation,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuantity { .. } => "INVALID_QUANTITY",
            Self::NegativeCost(_) => "NEGATIVE_COST",
            Self::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            Self::MissingDestination => "MISSING_DESTINATION_WAREHOUSE",
            Self::SameWarehouse => "SAME_WAREHOUSE_TRANSFER",
            Self::EntityMismatch { .. } => "ENTITY_MISMATCH",
            Self::InvalidSupplierAccount(_) => "INVALID_SUPPLIER_ACCOUNT",
            Self::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            Self::LinkageRequired(_) => "LINKAGE_REQUIRED",
            Self::MovementNotFound(_) => "STOCK_MOVEMENT_NOT_FOUND",
        }
    }
}
