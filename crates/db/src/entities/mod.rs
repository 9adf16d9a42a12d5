//! `SeaORM` entities.

pub mod accounts;
pub mod banks_wallets;
pub mod cash_boxes;
pub mod item_stock;
pub mod items;
pub mod journal_entries;
pub mod journal_entry_lines;
pub mod payment_voucher_operations;
pub mod payment_vouchers;
pub mod sea_orm_active_enums;
pub mod stock_movements;
pub mod warehouses;

/// Parses a JSON array of currency codes; anything else means "any currency".
#[must_use]
pub fn currency_list(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|codes| {
            codes
                .iter()
                .filter_map(|code| code.as_str().map(str::to_uppercase))
                .collect()
        })
        .unwrap_or_default()
}
