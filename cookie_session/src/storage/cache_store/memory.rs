use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::{CacheStore, InMemoryCacheStore, MemoryEntry};

const CACHE_PREFIX: &str = "cache";

fn expiry_after(ttl: usize) -> Result<Option<DateTime<Utc>>, StorageError> {
    if ttl == 0 {
        return Ok(None);
    }
    let lifetime = i64::try_from(ttl)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| StorageError::Storage(format!("TTL out of range: {ttl}")))?;
    Ok(Utc::now().checked_add_signed(lifetime))
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory session cache store");
        Self {
            entry: HashMap::new(),
        }
    }

    fn make_key(prefix: &str, key: &str) -> String {
        format!("{CACHE_PREFIX}:{prefix}:{key}")
    }

    fn purge_expired(&mut self) {
        self.entry.retain(|_, entry| !entry.is_expired());
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn put(&mut self, prefix: &str, key: &str, value: CacheData) -> Result<(), StorageError> {
        self.put_with_ttl(prefix, key, value, 0).await
    }

    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError> {
        self.purge_expired();

        let expires_at = expiry_after(ttl)?;
        let key = Self::make_key(prefix, key);
        self.entry.insert(
            key,
            MemoryEntry {
                data: value,
                expires_at,
            },
        );
        Ok(())
    }

    async fn put_if_not_exists(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<bool, StorageError> {
        self.purge_expired();

        let expires_at = expiry_after(ttl)?;
        match self.entry.entry(Self::make_key(prefix, key)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(MemoryEntry {
                    data: value,
                    expires_at,
                });
                Ok(true)
            }
        }
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let key = Self::make_key(prefix, key);
        Ok(self
            .entry
            .get(&key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.data.clone()))
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        let key = Self::make_key(prefix, key);
        self.entry.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(value: &str) -> CacheData {
        CacheData {
            value: value.to_string(),
        }
    }

    #[test]
    fn test_make_key() {
        let result = InMemoryCacheStore::make_key("session", "user123");
        assert_eq!(result, "cache:session:user123");
    }

    #[tokio::test]
    async fn test_init() {
        let store = InMemoryCacheStore::new();
        assert!(store.init().await.is_ok());
    }

    #[tokio::test]
    async fn test_put_and_get() {
        // Given an in-memory cache store
        let mut store = InMemoryCacheStore::new();

        // When putting a value
        store.put("test", "key1", data("test value")).await.unwrap();

        // Then it should be returned by get
        let retrieved = store.get("test", "key1").await.unwrap();
        assert_eq!(retrieved, Some(data("test value")));
    }

    #[tokio::test]
    async fn test_put_with_ttl_not_yet_expired() {
        let mut store = InMemoryCacheStore::new();

        store
            .put_with_ttl("test", "key2", data("with ttl"), 60)
            .await
            .unwrap();

        let retrieved = store.get("test", "key2").await.unwrap();
        assert_eq!(retrieved, Some(data("with ttl")));
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent_and_purged() {
        // Given an entry whose expiry already passed
        let mut store = InMemoryCacheStore::new();
        store.entry.insert(
            InMemoryCacheStore::make_key("test", "old"),
            MemoryEntry {
                data: data("stale"),
                expires_at: Some(Utc::now() - Duration::seconds(1)),
            },
        );

        // Then get reports it as absent
        assert_eq!(store.get("test", "old").await.unwrap(), None);

        // And the next write drops it
        store.put("test", "new", data("fresh")).await.unwrap();
        assert!(
            !store
                .entry
                .contains_key(&InMemoryCacheStore::make_key("test", "old"))
        );
    }

    #[tokio::test]
    async fn test_put_if_not_exists_keeps_existing_entry() {
        // Given a key that is already taken
        let mut store = InMemoryCacheStore::new();
        store.put("test", "taken", data("first")).await.unwrap();

        // When a second writer tries to claim it
        let inserted = store
            .put_if_not_exists("test", "taken", data("second"), 60)
            .await
            .unwrap();

        // Then the claim fails and the first value survives
        assert!(!inserted);
        assert_eq!(
            store.get("test", "taken").await.unwrap(),
            Some(data("first"))
        );
    }

    #[tokio::test]
    async fn test_put_if_not_exists_claims_free_and_expired_keys() {
        let mut store = InMemoryCacheStore::new();
        store.entry.insert(
            InMemoryCacheStore::make_key("test", "old"),
            MemoryEntry {
                data: data("stale"),
                expires_at: Some(Utc::now() - Duration::seconds(1)),
            },
        );

        assert!(
            store
                .put_if_not_exists("test", "free", data("a"), 0)
                .await
                .unwrap()
        );
        assert!(
            store
                .put_if_not_exists("test", "old", data("b"), 60)
                .await
                .unwrap()
        );
        assert_eq!(store.get("test", "free").await.unwrap(), Some(data("a")));
        assert_eq!(store.get("test", "old").await.unwrap(), Some(data("b")));
    }

    #[tokio::test]
    async fn test_remove() {
        let mut store = InMemoryCacheStore::new();
        store.put("test", "key3", data("value to remove")).await.unwrap();

        store.remove("test", "key3").await.unwrap();

        assert_eq!(store.get("test", "key3").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_nonexistent_key() {
        let mut store = InMemoryCacheStore::new();
        assert!(store.remove("test", "missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_multiple_prefixes() {
        let mut store = InMemoryCacheStore::new();

        store.put("prefix1", "same_key", data("one")).await.unwrap();
        store.put("prefix2", "same_key", data("two")).await.unwrap();

        assert_eq!(
            store.get("prefix1", "same_key").await.unwrap(),
            Some(data("one"))
        );
        assert_eq!(
            store.get("prefix2", "same_key").await.unwrap(),
            Some(data("two"))
        );
    }
}
