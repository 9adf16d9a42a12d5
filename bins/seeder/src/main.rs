//! Database seeder for Stockledger development.
//!
//! Seeds a demo entity with a small chart of accounts, two warehouses, a few
//! items, a cash box and a bank account, so the API can be exercised right
//! after `migrator up`. Running it twice is a no-op.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use serde_json::json;
use stockledger_db::entities::{
    accounts, banks_wallets, cash_boxes, items, warehouses,
    sea_orm_active_enums::{AccountSubtype, AccountType, BankWalletKind},
};
use stockledger_shared::AppConfig;
use uuid::Uuid;

/// Demo entity ID (stable across runs).
const DEMO_ENTITY_ID: Uuid = Uuid::from_u128(1);

/// Chart of accounts: code, name, type, subtype.
const CHART: &[(&str, &str, AccountType, Option<AccountSubtype>)] = &[
    ("1100", "Cash", AccountType::Asset, Some(AccountSubtype::Cash)),
    ("1200", "Bank", AccountType::Asset, Some(AccountSubtype::Bank)),
    ("1300", "Inventory", AccountType::Asset, Some(AccountSubtype::Warehouse)),
    ("2100", "Suppliers", AccountType::Liability, Some(AccountSubtype::Supplier)),
    ("3100", "Owner's equity", AccountType::Equity, None),
    ("4100", "Sales", AccountType::Income, None),
    ("5100", "Cost of goods sold", AccountType::Expense, None),
    ("5200", "Inventory adjustments", AccountType::Expense, Some(AccountSubtype::General)),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    println!("Connecting to database...");
    let db = stockledger_db::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    let existing = accounts::Entity::find()
        .filter(accounts::Column::EntityId.eq(DEMO_ENTITY_ID))
        .count(&db)
        .await?;
    if existing > 0 {
        println!("Demo entity {DEMO_ENTITY_ID} already seeded, skipping...");
        return Ok(());
    }

    println!("Seeding chart of accounts...");
    let inventory_account = seed_accounts(&db).await?;

    println!("Seeding warehouses...");
    for name in ["Main warehouse", "Store room"] {
        warehouses::ActiveModel {
            id: Set(Uuid::now_v7()),
            entity_id: Set(DEMO_ENTITY_ID),
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;
    }

    println!("Seeding items...");
    for (sku, name) in [("SB-100", "Steel bolts"), ("WN-200", "Wing nuts"), ("HP-300", "Hinge plates")] {
        items::ActiveModel {
            id: Set(Uuid::now_v7()),
            entity_id: Set(DEMO_ENTITY_ID),
            name: Set(name.to_string()),
            sku: Set(Some(sku.to_string())),
            stock_account_id: Set(Some(inventory_account)),
            ..Default::default()
        }
        .insert(&db)
        .await?;
    }

    println!("Seeding funding accounts...");
    cash_boxes::ActiveModel {
        id: Set(Uuid::now_v7()),
        entity_id: Set(DEMO_ENTITY_ID),
        name: Set("Front desk".to_string()),
        currencies: Set(json!(["USD"])),
        balance: Set(Decimal::from(5_000)),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    banks_wallets::ActiveModel {
        id: Set(Uuid::now_v7()),
        entity_id: Set(DEMO_ENTITY_ID),
        name: Set("Operating account".to_string()),
        kind: Set(BankWalletKind::Bank),
        currencies: Set(json!(["USD", "EUR"])),
        balance: Set(Decimal::from(100_000)),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    println!("Seeding complete! Demo entity: {DEMO_ENTITY_ID}");
    Ok(())
}

/// Inserts the demo chart and returns the inventory account ID.
async fn seed_accounts(db: &DatabaseConnection) -> anyhow::Result<Uuid> {
    let mut inventory = None;

    for (code, name, account_type, subtype) in CHART {
        let row = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            entity_id: Set(DEMO_ENTITY_ID),
            code: Set(Some((*code).to_string())),
            name: Set((*name).to_string()),
            account_type: Set(*account_type),
            subtype: Set(*subtype),
            is_group: Set(false),
            currencies: Set(json!([])),
            balance: Set(Decimal::ZERO),
            ..Default::default()
        }
        .insert(db)
        .await?;
        println!("  {code} {name}");

        if *subtype == Some(AccountSubtype::Warehouse) {
            inventory = Some(row.id);
        }
    }

    inventory.context("chart has no inventory account")
}
