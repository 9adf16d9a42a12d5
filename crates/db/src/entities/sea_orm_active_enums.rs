//! `SeaORM` active enums backed by `PostgreSQL` enum types, with conversions
//! to and from the core domain enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use stockledger_core::{inventory, ledger, payment};

/// Generates a `DeriveActiveEnum` mirror of a core enum plus both `From` impls.
macro_rules! db_enum {
    (
        $(#[$meta:meta])*
        $name:ident => $domain:path, $pg:literal {
            $($variant:ident = $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
        )]
        #[sea_orm(rs_type = "String", db_type = "Enum", enum_name = $pg)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $(
                #[allow(missing_docs)]
                #[sea_orm(string_value = $value)]
                $variant,
            )+
        }

        impl From<$name> for $domain {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$domain> for $name {
            fn from(value: $domain) -> Self {
                type Domain = $domain;
                match value {
                    $(Domain::$variant => Self::$variant,)+
                }
            }
        }
    };
}

db_enum! {
    /// Chart-of-accounts classification.
    AccountType => ledger::AccountType, "account_type" {
        Asset = "asset",
        Liability = "liability",
        Equity = "equity",
        Income = "income",
        Expense = "expense",
    }
}

db_enum! {
    /// Account role.
    AccountSubtype => ledger::AccountSubtype, "account_subtype" {
        Cash = "cash",
        Bank = "bank",
        Wallet = "wallet",
        Exchange = "exchange",
        Supplier = "supplier",
        Customer = "customer",
        Employee = "employee",
        Warehouse = "warehouse",
        General = "general",
        Intercompany = "intercompany",
    }
}

db_enum! {
    /// Journal entry lifecycle status.
    EntryStatus => ledger::EntryStatus, "entry_status" {
        Draft = "draft",
        Posted = "posted",
        Cancelled = "cancelled",
    }
}

db_enum! {
    /// What produced a journal entry.
    EntryKind => ledger::EntryKind, "entry_kind" {
        Manual = "manual",
        Auto = "auto",
        Opening = "opening",
        Adjustment = "adjustment",
        Reversal = "reversal",
    }
}

db_enum! {
    /// Stock movement kind.
    MovementType => inventory::MovementType, "movement_type" {
        In = "in",
        Out = "out",
        Transfer = "transfer",
        Adjustment = "adjustment",
        Return = "return",
    }
}

db_enum! {
    /// Business event behind a movement.
    ReferenceType => inventory::ReferenceType, "reference_type" {
        Manual = "manual",
        Purchase = "purchase",
        Sale = "sale",
        Issue = "issue",
        Transfer = "transfer",
        Adjustment = "adjustment",
        Return = "return",
        Opening = "opening",
    }
}

db_enum! {
    /// Settlement of a purchase.
    PaymentMethod => inventory::PaymentMethod, "payment_method" {
        Credit = "credit",
        Cash = "cash",
    }
}

db_enum! {
    /// Voucher direction.
    VoucherType => payment::VoucherType, "voucher_type" {
        In = "in",
        Out = "out",
    }
}

/// Kind of bank/wallet funding account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "bank_wallet_kind")]
#[serde(rename_all = "snake_case")]
pub enum BankWalletKind {
    /// Bank account.
    #[sea_orm(string_value = "bank")]
    Bank,
    /// Electronic wallet.
    #[sea_orm(string_value = "wallet")]
    Wallet,
    /// Money exchange house account.
    #[sea_orm(string_value = "exchange")]
    Exchange,
}
