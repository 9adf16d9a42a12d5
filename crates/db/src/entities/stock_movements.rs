//! `SeaORM` Entity for stock_movements table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{MovementType, PaymentMethod, ReferenceType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entity_id: Uuid,
    pub item_id: Uuid,
    pub warehouse_id: Uuid,
    pub to_warehouse_id: Option<Uuid>,
    pub movement_type: MovementType,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))", nullable)]
    pub unit_cost: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))", nullable)]
    pub total_cost: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub effective_unit_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub total_value: Decimal,
    pub currency: String,
    pub reference: Option<String>,
    pub reference_type: ReferenceType,
    pub movement_date: Date,
    pub notes: Option<String>,
    pub to_account_id: Option<Uuid>,
    pub supplier_account_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
    pub cash_box_id: Option<Uuid>,
    pub bank_wallet_id: Option<Uuid>,
    pub journal_entry_id: Option<Uuid>,
    pub payment_voucher_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
