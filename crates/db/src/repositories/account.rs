//! Account directory: read-only chart-of-accounts lookups.
//!
//! Lookups return `Option` instead of failing, so callers can apply a
//! fallback or skip policy. The only write the journal engine performs on
//! `accounts` is the balance cache, through [`AccountRepository::lock_accounts`].

use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use stockledger_core::ledger::{AccountCache, AccountInfo, AccountSubtype, AccountSummary};
use stockledger_shared::types::{AccountId, EntityId};

use crate::entities::{accounts, currency_list, sea_orm_active_enums as db_enums};
use crate::error::StoreResult;
use crate::unit_of_work::DbHandle;

/// Account repository for chart-of-accounts lookups.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DbHandle,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DbHandle) -> Self {
        Self { db }
    }

    /// Finds an account by ID.
    pub async fn find_account(&self, id: AccountId) -> StoreResult<Option<accounts::Model>> {
        Self::find_in(self.db.conn(), id).await
    }

    /// Lists an entity's accounts, served from `cache` when present.
    pub async fn list_for_entity(
        &self,
        entity_id: EntityId,
        cache: &AccountCache,
    ) -> StoreResult<Arc<Vec<AccountSummary>>> {
        if let Some(cached) = cache.get(entity_id) {
            return Ok(cached);
        }

        let loaded_at = cache.generation();
        let rows = accounts::Entity::find()
            .filter(accounts::Column::EntityId.eq(entity_id.into_inner()))
            .order_by_asc(accounts::Column::Code)
            .order_by_asc(accounts::Column::Name)
            .all(self.db.conn())
            .await?;

        Ok(cache.insert(
            entity_id,
            loaded_at,
            rows.iter().map(account_summary).collect(),
        ))
    }

    /// Finds an account by ID on any connection or transaction.
    pub async fn find_in<C: ConnectionTrait>(
        conn: &C,
        id: AccountId,
    ) -> StoreResult<Option<accounts::Model>> {
        Ok(accounts::Entity::find_by_id(id.into_inner()).one(conn).await?)
    }

    /// Finds the first non-group account of `subtype` for an entity.
    pub async fn first_by_subtype_in<C: ConnectionTrait>(
        conn: &C,
        subtype: AccountSubtype,
        entity_id: EntityId,
    ) -> StoreResult<Option<accounts::Model>> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::EntityId.eq(entity_id.into_inner()))
            .filter(accounts::Column::Subtype.eq(db_enums::AccountSubtype::from(subtype)))
            .filter(accounts::Column::IsGroup.eq(false))
            .order_by_asc(accounts::Column::CreatedAt)
            .order_by_asc(accounts::Column::Id)
            .one(conn)
            .await?;
        Ok(account)
    }

    /// Loads accounts by ID without locking.
    pub async fn load_accounts<C: ConnectionTrait>(
        conn: &C,
        ids: &[AccountId],
    ) -> StoreResult<HashMap<AccountId, accounts::Model>> {
        let rows = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(ids.iter().map(|id| id.into_inner())))
            .all(conn)
            .await?;
        Ok(by_id(rows))
    }

    /// Loads and locks accounts with `SELECT ... FOR UPDATE`.
    ///
    /// `ids` must be in ascending order (see `LedgerService::lock_order`);
    /// rows are locked in that order so concurrent postings cannot deadlock.
    pub async fn lock_accounts<C: ConnectionTrait>(
        conn: &C,
        ids: &[AccountId],
    ) -> StoreResult<HashMap<AccountId, accounts::Model>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(ids.iter().map(|id| id.into_inner())))
            .order_by_asc(accounts::Column::Id)
            .lock_exclusive()
            .all(conn)
            .await?;
        Ok(by_id(rows))
    }
}

fn by_id(rows: Vec<accounts::Model>) -> HashMap<AccountId, accounts::Model> {
    rows.into_iter()
        .map(|row| (AccountId::from(row.id), row))
        .collect()
}

/// Converts a row into the data the ledger validates against.
#[must_use]
pub fn account_info(model: &accounts::Model) -> AccountInfo {
    AccountInfo {
        id: model.id.into(),
        entity_id: model.entity_id.into(),
        account_type: model.account_type.into(),
        subtype: model.subtype.map(Into::into),
        is_group: model.is_group,
        currencies: currency_list(&model.currencies),
    }
}

/// Converts a row into its listing form.
#[must_use]
pub fn account_summary(model: &accounts::Model) -> AccountSummary {
    AccountSummary {
        id: model.id.into(),
        entity_id: model.entity_id.into(),
        parent_id: model.parent_id.map(Into::into),
        code: model.code.clone(),
        name: model.name.clone(),
        account_type: model.account_type.into(),
        subtype: model.subtype.map(Into::into),
        is_group: model.is_group,
        currencies: currency_list(&model.currencies),
        balance: model.balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::{AccountSubtype as DbSubtype, AccountType};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use stockledger_core::ledger;
    use uuid::Uuid;

    fn model() -> accounts::Model {
        let now = Utc::now().into();
        accounts::Model {
            id: Uuid::now_v7(),
            entity_id: Uuid::now_v7(),
            parent_id: None,
            code: Some("2100".to_string()),
            name: "Suppliers".to_string(),
            account_type: AccountType::Liability,
            subtype: Some(DbSubtype::Supplier),
            is_group: false,
            currencies: json!(["usd"]),
            balance: dec!(25000),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_account_info() {
        let row = model();
        let info = account_info(&row);
        assert_eq!(info.id.into_inner(), row.id);
        assert_eq!(info.account_type, ledger::AccountType::Liability);
        assert_eq!(info.subtype, Some(ledger::AccountSubtype::Supplier));
        assert_eq!(info.currencies, vec!["USD".to_string()]);
        assert!(info.allows_currency("USD"));
    }

    #[test]
    fn test_account_summary() {
        let row = model();
        let summary = account_summary(&row);
        assert_eq!(summary.name, "Suppliers");
        assert_eq!(summary.balance, dec!(25000));
    }
}
