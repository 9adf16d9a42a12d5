//! Read-through cache of account lists using Moka.
//!
//! Listing an entity's chart of accounts is read far more often than it
//! changes. Every write that can change a balance must call
//! [`AccountCache::invalidate`] (or [`AccountCache::invalidate_all`]) before
//! the response is returned.
//!
//! A load that started before an invalidation must not repopulate the
//! cache with what it read: callers take [`AccountCache::generation`]
//! before querying and hand it back to [`AccountCache::insert`].

use moka::sync::Cache;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use stockledger_shared::types::EntityId;

use super::types::AccountSummary;

/// Cache of account lists keyed by entity.
#[derive(Clone)]
pub struct AccountCache {
    cache: Cache<EntityId, Arc<Vec<AccountSummary>>>,
    generation: Arc<AtomicU64>,
}

impl AccountCache {
    /// Creates a cache holding at most `max_capacity` entity lists for `ttl_secs`.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the cached list for an entity.
    #[must_use]
    pub fn get(&self, entity_id: EntityId) -> Option<Arc<Vec<AccountSummary>>> {
        self.cache.get(&entity_id)
    }

    /// Current invalidation generation; take it before loading a list.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Stores the list for an entity, loaded at generation `loaded_at`.
    ///
    /// If any invalidation ran since `loaded_at` the entry is dropped again;
    /// the list is still returned to the caller.
    pub fn insert(
        &self,
        entity_id: EntityId,
        loaded_at: u64,
        accounts: Vec<AccountSummary>,
    ) -> Arc<Vec<AccountSummary>> {
        let accounts = Arc::new(accounts);
        self.cache.insert(entity_id, Arc::clone(&accounts));
        if self.generation() != loaded_at {
            self.cache.invalidate(&entity_id);
        }
        accounts
    }

    /// Drops the cached list of one entity.
    pub fn invalidate(&self, entity_id: EntityId) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate(&entity_id);
    }

    /// Drops every cached list.
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate_all();
    }
}

impl Default for AccountCache {
    fn default() -> Self {
        Self::with_config(256, 300)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::AccountType;
    use rust_decimal_macros::dec;
    use stockledger_shared::types::AccountId;

    fn summary(entity_id: EntityId) -> AccountSummary {
        AccountSummary {
            id: AccountId::new(),
            entity_id,
            parent_id: None,
            code: Some("1300".to_string()),
            name: "Inventory".to_string(),
            account_type: AccountType::Asset,
            subtype: None,
            is_group: false,
            currencies: vec![],
            balance: dec!(25000),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let cache = AccountCache::default();
        let entity = EntityId::new();
        assert!(cache.get(entity).is_none());

        cache.insert(entity, cache.generation(), vec![summary(entity)]);
        let cached = cache.get(entity).unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].balance, dec!(25000));
    }

    #[test]
    fn test_invalidate_single_entity() {
        let cache = AccountCache::default();
        let first = EntityId::new();
        let second = EntityId::new();
        cache.insert(first, cache.generation(), vec![summary(first)]);
        cache.insert(second, cache.generation(), vec![summary(second)]);

        cache.invalidate(first);

        assert!(cache.get(first).is_none());
        assert!(cache.get(second).is_some());
    }

    #[test]
    fn test_invalidate_all() {
        let cache = AccountCache::with_config(10, 60);
        let entity = EntityId::new();
        cache.insert(entity, cache.generation(), vec![summary(entity)]);

        cache.invalidate_all();

        assert!(cache.get(entity).is_none());
    }

    #[test]
    fn test_load_overtaken_by_invalidation_is_not_cached() {
        let cache = AccountCache::default();
        let entity = EntityId::new();
        let loaded_at = cache.generation();

        cache.invalidate(entity);
        let returned = cache.insert(entity, loaded_at, vec![summary(entity)]);

        assert_eq!(returned.len(), 1);
        assert!(cache.get(entity).is_none());

        cache.insert(entity, cache.generation(), vec![summary(entity)]);
        assert!(cache.get(entity).is_some());
    }

    #[test]
    fn test_clones_share_generation() {
        let cache = AccountCache::default();
        let handle = cache.clone();
        let entity = EntityId::new();
        let loaded_at = cache.generation();

        handle.invalidate(EntityId::new());
        cache.insert(entity, loaded_at, vec![summary(entity)]);

        assert!(handle.get(entity).is_none());
    }
}
