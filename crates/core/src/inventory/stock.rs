//! Per-warehouse stock levels and the deltas applied to them.
//!
//! Quantities are plain signed sums. The average cost is a moving,
//! quantity-weighted average kept at four decimal places; it only moves on
//! inbound deltas and on the mirrored reversal of an inbound.

use rust_decimal::Decimal;
use serde::Serialize;
use stockledger_shared::types::{ItemId, WarehouseId, fits_amount, round_cost};

use super::error::{InsufficientStock, InventoryError};

/// Stock of one item in one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    /// Quantity on hand.
    pub quantity: Decimal,
    /// Moving average unit cost.
    pub avg_cost: Decimal,
    /// Unit cost of the latest purchase.
    pub last_purchase_price: Option<Decimal>,
    /// Unit price of the latest sale.
    pub last_sale_price: Option<Decimal>,
}

/// How a delta affects the average cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostEffect {
    /// Blend the delta quantity in at this unit cost.
    Blend(Decimal),
    /// Take back a quantity previously blended in at this unit cost.
    Unblend(Decimal),
    /// Leave the average cost unchanged.
    Keep,
}

impl CostEffect {
    /// Returns the effect that undoes this one.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::Blend(cost) => Self::Unblend(cost),
            Self::Unblend(cost) => Self::Blend(cost),
            Self::Keep => Self::Keep,
        }
    }
}

/// Last-price bookkeeping carried by a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceMark {
    /// Record a purchase price.
    Purchase(Decimal),
    /// Record a sale price.
    Sale(Decimal),
}

/// A signed change to one warehouse's stock of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDelta {
    /// Warehouse affected.
    pub warehouse_id: WarehouseId,
    /// Signed quantity change.
    pub quantity: Decimal,
    /// Effect on the average cost.
    pub cost: CostEffect,
    /// Price to remember, if any.
    pub price: Option<PriceMark>,
}

impl StockDelta {
    /// Returns the delta that undoes this one.
    ///
    /// Last prices are not restored; they record history, not state.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            warehouse_id: self.warehouse_id,
            quantity: -self.quantity,
            cost: self.cost.mirrored(),
            price: None,
        }
    }

    /// Returns true if the delta takes stock out.
    #[must_use]
    pub fn is_decrement(&self) -> bool {
        self.quantity < Decimal::ZERO
    }
}

impl StockLevel {
    /// Applies a delta without any stock check.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::AmountOutOfRange` when the resulting quantity
    /// or average cost would not fit a stock column.
    pub fn apply(&self, delta: &StockDelta) -> Result<Self, InventoryError> {
        let quantity = self
            .quantity
            .checked_add(delta.quantity)
            .filter(|q| fits_amount(*q))
            .ok_or(InventoryError::AmountOutOfRange {
                field: "quantity",
                value: delta.quantity,
            })?;
        let avg_cost = match delta.cost {
            CostEffect::Blend(cost) => self.blend(delta.quantity, cost),
            CostEffect::Unblend(cost) => self.unblend(delta.quantity, cost),
            CostEffect::Keep => Some(self.avg_cost),
        }
        .filter(|cost| fits_amount(*cost))
        .ok_or(InventoryError::AmountOutOfRange {
            field: "averageCost",
            value: delta.quantity,
        })?;

        let mut next = Self {
            quantity,
            avg_cost,
            last_purchase_price: self.last_purchase_price,
            last_sale_price: self.last_sale_price,
        };
        match delta.price {
            Some(PriceMark::Purchase(price)) => next.last_purchase_price = Some(price),
            Some(PriceMark::Sale(price)) => next.last_sale_price = Some(price),
            None => {}
        }
        Ok(next)
    }

    /// Applies a delta, rejecting decrements below zero unless negative
    /// stock is allowed.
    ///
    /// A missing row is passed as `None`; it behaves as an empty level.
    pub fn apply_checked(
        current: Option<&Self>,
        delta: &StockDelta,
        item_id: ItemId,
        allow_negative: bool,
    ) -> Result<Self, InventoryError> {
        let empty = Self::default();
        let current = current.unwrap_or(&empty);
        let next = current.apply(delta)?;

        if delta.is_decrement() && next.quantity < Decimal::ZERO && !allow_negative {
            return Err(InventoryError::InsufficientStock(InsufficientStock {
                item_id,
                warehouse_id: delta.warehouse_id,
                available: current.quantity,
                requested: -delta.quantity,
            }));
        }

        Ok(next)
    }

    /// Stock value after adding `quantity` at `cost`, or `None` on overflow.
    fn value_with(&self, quantity: Decimal, cost: Decimal) -> Option<Decimal> {
        self.quantity
            .checked_mul(self.avg_cost)?
            .checked_add(quantity.checked_mul(cost)?)
    }

    fn blend(&self, quantity: Decimal, cost: Decimal) -> Option<Decimal> {
        let total = self.quantity.checked_add(quantity)?;
        if self.quantity <= Decimal::ZERO || total <= Decimal::ZERO {
            return Some(round_cost(cost));
        }
        let value = self.value_with(quantity, cost)?;
        Some(round_cost(value.checked_div(total)?))
    }

    fn unblend(&self, quantity: Decimal, cost: Decimal) -> Option<Decimal> {
        // `quantity` is the (negative) amount being taken back.
        let remaining = self.quantity.checked_add(quantity)?;
        if remaining <= Decimal::ZERO {
            return Some(self.avg_cost);
        }
        let value = self.value_with(quantity, cost)?;
        Some(round_cost(value.checked_div(remaining)?).max(Decimal::ZERO))
    }
}
