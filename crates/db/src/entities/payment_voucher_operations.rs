//! `SeaORM` Entity for payment_voucher_operations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AccountSubtype, AccountType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_voucher_operations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub voucher_id: Uuid,
    pub line_no: i32,
    pub account_type: AccountType,
    pub account_subtype: Option<AccountSubtype>,
    pub chart_account_id: Uuid,
    pub analytical_account_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payment_vouchers::Entity",
        from = "Column::VoucherId",
        to = "super::payment_vouchers::Column::Id"
    )]
    PaymentVouchers,
}

impl Related<super::payment_vouchers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentVouchers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
