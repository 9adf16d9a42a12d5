//! Inventory: stock levels, movement planning and movement reversal.

pub mod error;
pub mod processor;
pub mod stock;
pub mod types;

#[cfg(test)]
mod processor_props;

pub use error::{InsufficientStock, InventoryError};
pub use processor::{MovementPlan, PaymentPlan, PlanContext, StockEffect, StockMovementProcessor};
pub use stock::{CostEffect, PriceMark, StockDelta, StockLevel};
pub use types::{
    ItemInfo, MovementType, PaymentMethod, ReferenceType, StockMovementInput, WarehouseInfo,
};
