//! `SeaORM` Entity for payment_vouchers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::VoucherType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_vouchers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entity_id: Uuid,
    pub voucher_type: VoucherType,
    pub cash_box_id: Option<Uuid>,
    pub bank_wallet_id: Option<Uuid>,
    pub voucher_date: Date,
    pub currency: String,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub exchange_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub total_amount: Decimal,
    pub reference: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payment_voucher_operations::Entity")]
    PaymentVoucherOperations,
}

impl Related<super::payment_voucher_operations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentVoucherOperations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
