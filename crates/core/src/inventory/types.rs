//! Inventory domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockledger_shared::types::{AccountId, EntityId, ItemId, WarehouseId};

use crate::payment::FundingAccount;

/// Kind of stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Goods received.
    In,
    /// Goods issued.
    Out,
    /// Goods moved between two warehouses of the same entity.
    Transfer,
    /// Signed correction of the counted quantity.
    Adjustment,
    /// Goods returned into stock.
    Return,
}

impl MovementType {
    /// Returns true for movements that bring goods into the warehouse.
    #[must_use]
    pub const fn is_inbound(self) -> bool {
        matches!(self, Self::In | Self::Return)
    }

    /// Returns true if the quantity may be negative.
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Adjustment)
    }
}

/// Business event that produced a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    /// Entered by hand.
    #[default]
    Manual,
    /// Supplier purchase.
    Purchase,
    /// Customer sale.
    Sale,
    /// Internal issue to consumption.
    Issue,
    /// Warehouse transfer.
    Transfer,
    /// Stock count correction.
    Adjustment,
    /// Customer or supplier return.
    Return,
    /// Opening balance.
    Opening,
}

/// How a purchase is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// On account; the supplier is paid later.
    #[default]
    Credit,
    /// Paid immediately from a cash box or bank/wallet account.
    Cash,
}

/// A request to move stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockMovementInput {
    /// Owning entity.
    pub entity_id: EntityId,
    /// The item moved.
    pub item_id: ItemId,
    /// Warehouse affected (source warehouse for transfers).
    pub warehouse_id: WarehouseId,
    /// Destination warehouse, transfers only.
    pub to_warehouse_id: Option<WarehouseId>,
    /// Movement kind.
    pub movement_type: MovementType,
    /// Quantity; positive except for adjustments, which are signed.
    pub quantity: Decimal,
    /// Cost per unit.
    pub unit_cost: Option<Decimal>,
    /// Total cost; wins over `quantity * unit_cost` for valuation.
    pub total_cost: Option<Decimal>,
    /// Currency of the costs; the configured default when absent.
    pub currency: Option<String>,
    /// External reference, e.g. invoice number.
    pub reference: Option<String>,
    /// Business event.
    pub reference_type: ReferenceType,
    /// Movement date.
    pub date: NaiveDate,
    /// Free text.
    pub notes: Option<String>,
    /// COGS account for issues, adjustment account for adjustments.
    pub to_account_id: Option<AccountId>,
    /// Supplier payable credited by purchases.
    pub supplier_account_id: Option<AccountId>,
    /// Settlement of a purchase.
    pub payment_method: PaymentMethod,
    /// Funding account for cash purchases.
    pub payment_account: Option<FundingAccount>,
}

/// Item data the processor needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInfo {
    /// Item ID.
    pub id: ItemId,
    /// Owning entity.
    pub entity_id: EntityId,
    /// Item name, used in entry descriptions.
    pub name: String,
    /// Inventory asset account valued by this item.
    pub stock_account_id: Option<AccountId>,
}

/// Warehouse data the processor needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseInfo {
    /// Warehouse ID.
    pub id: WarehouseId,
    /// Owning entity.
    pub entity_id: EntityId,
}
