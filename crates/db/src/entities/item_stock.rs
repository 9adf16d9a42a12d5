//! `SeaORM` Entity for item_stock table.
//!
//! One row per `(item_id, warehouse_id)`, unique. Rows are created and
//! updated only by the balance store.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "item_stock")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub item_id: Uuid,
    pub warehouse_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub avg_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))", nullable)]
    pub last_purchase_price: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))", nullable)]
    pub last_sale_price: Option<Decimal>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
