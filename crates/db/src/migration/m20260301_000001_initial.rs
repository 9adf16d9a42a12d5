//! Initial database migration.
//!
//! Creates the enums, the collaborator tables the posting engine reads
//! (accounts, items, warehouses, cash boxes, banks/wallets) and the tables
//! it writes (journal, stock, vouchers).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: COLLABORATOR TABLES
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(ITEMS_SQL).await?;
        db.execute_unprepared(WAREHOUSES_SQL).await?;
        db.execute_unprepared(FUNDING_SQL).await?;

        // ============================================================
        // PART 3: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_SQL).await?;

        // ============================================================
        // PART 4: VOUCHERS
        // ============================================================
        db.execute_unprepared(VOUCHERS_SQL).await?;

        // ============================================================
        // PART 5: STOCK
        // ============================================================
        db.execute_unprepared(STOCK_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM ('asset', 'liability', 'equity', 'income', 'expense');

CREATE TYPE account_subtype AS ENUM (
    'cash', 'bank', 'wallet', 'exchange', 'supplier', 'customer',
    'employee', 'warehouse', 'general', 'intercompany'
);

CREATE TYPE entry_status AS ENUM ('draft', 'posted', 'cancelled');

CREATE TYPE entry_kind AS ENUM ('manual', 'auto', 'opening', 'adjustment', 'reversal');

CREATE TYPE movement_type AS ENUM ('in', 'out', 'transfer', 'adjustment', 'return');

CREATE TYPE reference_type AS ENUM (
    'manual', 'purchase', 'sale', 'issue', 'transfer', 'adjustment', 'return', 'opening'
);

CREATE TYPE payment_method AS ENUM ('credit', 'cash');

CREATE TYPE voucher_type AS ENUM ('in', 'out');

CREATE TYPE bank_wallet_kind AS ENUM ('bank', 'wallet', 'exchange');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id              UUID PRIMARY KEY,
    entity_id       UUID NOT NULL,
    parent_id       UUID REFERENCES accounts(id),
    code            VARCHAR(32),
    name            VARCHAR(255) NOT NULL,
    account_type    account_type NOT NULL,
    subtype         account_subtype,
    is_group        BOOLEAN NOT NULL DEFAULT FALSE,
    currencies      JSONB NOT NULL DEFAULT '[]'::jsonb,
    -- Written only by the journal engine while posting
    balance         NUMERIC(20, 4) NOT NULL DEFAULT 0,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_accounts_entity ON accounts(entity_id);
CREATE INDEX idx_accounts_entity_subtype ON accounts(entity_id, subtype) WHERE NOT is_group;
";

const ITEMS_SQL: &str = r"
CREATE TABLE items (
    id                  UUID PRIMARY KEY,
    entity_id           UUID NOT NULL,
    name                VARCHAR(255) NOT NULL,
    sku                 VARCHAR(64),
    stock_account_id    UUID REFERENCES accounts(id),
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_items_entity ON items(entity_id);
";

const WAREHOUSES_SQL: &str = r"
CREATE TABLE warehouses (
    id          UUID PRIMARY KEY,
    entity_id   UUID NOT NULL,
    name        VARCHAR(255) NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const FUNDING_SQL: &str = r"
CREATE TABLE cash_boxes (
    id          UUID PRIMARY KEY,
    entity_id   UUID NOT NULL,
    name        VARCHAR(255) NOT NULL,
    currencies  JSONB NOT NULL DEFAULT '[]'::jsonb,
    balance     NUMERIC(20, 4) NOT NULL DEFAULT 0,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE banks_wallets (
    id          UUID PRIMARY KEY,
    entity_id   UUID NOT NULL,
    name        VARCHAR(255) NOT NULL,
    kind        bank_wallet_kind NOT NULL,
    currencies  JSONB NOT NULL DEFAULT '[]'::jsonb,
    balance     NUMERIC(20, 4) NOT NULL DEFAULT 0,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const JOURNAL_SQL: &str = r"
CREATE TABLE journal_entries (
    id              UUID PRIMARY KEY,
    entity_id       UUID NOT NULL,
    entry_date      DATE NOT NULL,
    description     TEXT NOT NULL,
    reference       VARCHAR(128),
    kind            entry_kind NOT NULL,
    status          entry_status NOT NULL DEFAULT 'draft',
    reversal_of     UUID REFERENCES journal_entries(id),
    reversed_by     UUID REFERENCES journal_entries(id),
    posted_at       TIMESTAMPTZ,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_journal_entries_entity_date ON journal_entries(entity_id, entry_date);

CREATE TABLE journal_entry_lines (
    id                  UUID PRIMARY KEY,
    entry_id            UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    line_no             INTEGER NOT NULL,
    account_id          UUID NOT NULL REFERENCES accounts(id),
    debit               NUMERIC(20, 4) NOT NULL DEFAULT 0,
    credit              NUMERIC(20, 4) NOT NULL DEFAULT 0,
    currency            VARCHAR(3) NOT NULL,
    description         TEXT,
    account_version     BIGINT,
    previous_balance    NUMERIC(20, 4),
    current_balance     NUMERIC(20, 4),
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_line_non_negative CHECK (debit >= 0 AND credit >= 0),
    CONSTRAINT chk_line_one_side CHECK ((debit > 0) <> (credit > 0)),
    CONSTRAINT uq_line_no UNIQUE (entry_id, line_no)
);

CREATE UNIQUE INDEX idx_lines_account_version
    ON journal_entry_lines(account_id, account_version)
    WHERE account_version IS NOT NULL;
";

const VOUCHERS_SQL: &str = r"
CREATE TABLE payment_vouchers (
    id              UUID PRIMARY KEY,
    entity_id       UUID NOT NULL,
    voucher_type    voucher_type NOT NULL,
    cash_box_id     UUID REFERENCES cash_boxes(id),
    bank_wallet_id  UUID REFERENCES banks_wallets(id),
    voucher_date    DATE NOT NULL,
    currency        VARCHAR(3) NOT NULL,
    exchange_rate   NUMERIC(20, 8) NOT NULL DEFAULT 1,
    total_amount    NUMERIC(20, 4) NOT NULL,
    reference       VARCHAR(128),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_voucher_single_funding CHECK ((cash_box_id IS NULL) <> (bank_wallet_id IS NULL)),
    CONSTRAINT chk_voucher_total_positive CHECK (total_amount > 0)
);

CREATE TABLE payment_voucher_operations (
    id                      UUID PRIMARY KEY,
    voucher_id              UUID NOT NULL REFERENCES payment_vouchers(id) ON DELETE CASCADE,
    line_no                 INTEGER NOT NULL,
    account_type            account_type NOT NULL,
    account_subtype         account_subtype,
    chart_account_id        UUID NOT NULL REFERENCES accounts(id),
    analytical_account_id   UUID REFERENCES accounts(id),
    amount                  NUMERIC(20, 4) NOT NULL CHECK (amount > 0),
    description             TEXT,

    CONSTRAINT uq_operation_line_no UNIQUE (voucher_id, line_no)
);
";

const STOCK_SQL: &str = r"
CREATE TABLE item_stock (
    id                  UUID PRIMARY KEY,
    item_id             UUID NOT NULL REFERENCES items(id),
    warehouse_id        UUID NOT NULL REFERENCES warehouses(id),
    quantity            NUMERIC(20, 4) NOT NULL DEFAULT 0,
    avg_cost            NUMERIC(20, 4) NOT NULL DEFAULT 0,
    last_purchase_price NUMERIC(20, 4),
    last_sale_price     NUMERIC(20, 4),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_item_stock_item_warehouse UNIQUE (item_id, warehouse_id)
);

CREATE TABLE stock_movements (
    id                  UUID PRIMARY KEY,
    entity_id           UUID NOT NULL,
    item_id             UUID NOT NULL REFERENCES items(id),
    warehouse_id        UUID NOT NULL REFERENCES warehouses(id),
    to_warehouse_id     UUID REFERENCES warehouses(id),
    movement_type       movement_type NOT NULL,
    quantity            NUMERIC(20, 4) NOT NULL,
    unit_cost           NUMERIC(20, 4),
    total_cost          NUMERIC(20, 4),
    effective_unit_cost NUMERIC(20, 4) NOT NULL,
    total_value         NUMERIC(20, 4) NOT NULL,
    currency            VARCHAR(3) NOT NULL,
    reference           VARCHAR(128),
    reference_type      reference_type NOT NULL DEFAULT 'manual',
    movement_date       DATE NOT NULL,
    notes               TEXT,
    to_account_id       UUID REFERENCES accounts(id),
    supplier_account_id UUID REFERENCES accounts(id),
    payment_method      payment_method NOT NULL DEFAULT 'credit',
    cash_box_id         UUID REFERENCES cash_boxes(id),
    bank_wallet_id      UUID REFERENCES banks_wallets(id),
    journal_entry_id    UUID REFERENCES journal_entries(id),
    payment_voucher_id  UUID REFERENCES payment_vouchers(id),
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_transfer_destination CHECK (
        (movement_type = 'transfer') = (to_warehouse_id IS NOT NULL)
    ),
    CONSTRAINT chk_payment_single_account CHECK (
        cash_box_id IS NULL OR bank_wallet_id IS NULL
    )
);

CREATE INDEX idx_stock_movements_item_warehouse ON stock_movements(item_id, warehouse_id, movement_date);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS stock_movements;
DROP TABLE IF EXISTS item_stock;
DROP TABLE IF EXISTS payment_voucher_operations;
DROP TABLE IF EXISTS payment_vouchers;
DROP TABLE IF EXISTS journal_entry_lines;
DROP TABLE IF EXISTS journal_entries;
DROP TABLE IF EXISTS banks_wallets;
DROP TABLE IF EXISTS cash_boxes;
DROP TABLE IF EXISTS warehouses;
DROP TABLE IF EXISTS items;
DROP TABLE IF EXISTS accounts;

DROP TYPE IF EXISTS bank_wallet_kind;
DROP TYPE IF EXISTS voucher_type;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS reference_type;
DROP TYPE IF EXISTS movement_type;
DROP TYPE IF EXISTS entry_kind;
DROP TYPE IF EXISTS entry_status;
DROP TYPE IF EXISTS account_subtype;
DROP TYPE IF EXISTS account_type;
";
