use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::{SESSION_STORE_TYPE, SESSION_STORE_URL};
use crate::storage::errors::StorageError;

use super::types::{CacheStore, InMemoryCacheStore, RedisCacheStore};

/// Cache store handle shared by every request of a process.
pub type SharedCacheStore = Arc<Mutex<Box<dyn CacheStore>>>;

/// A fresh in-memory cache store.
pub fn memory_cache_store() -> SharedCacheStore {
    Arc::new(Mutex::new(Box::new(InMemoryCacheStore::new())))
}

/// Build the cache store selected by `SESSION_STORE_TYPE`.
pub async fn init_cache_store() -> Result<SharedCacheStore, StorageError> {
    let store_type = SESSION_STORE_TYPE.as_str();

    tracing::info!("Initializing session cache store with type: {}", store_type);

    let store: Box<dyn CacheStore> = match store_type {
        "memory" => Box::new(InMemoryCacheStore::new()),
        "redis" => {
            let store_url = SESSION_STORE_URL.as_str();
            let client = redis::Client::open(store_url).map_err(|e| {
                tracing::error!("Failed to create Redis client: {}", e);
                StorageError::from(e)
            })?;
            let store = RedisCacheStore::new(client);
            // Fail early when the server is not reachable
            store.init().await.map_err(|e| {
                tracing::error!("Failed to connect to Redis: {}", e);
                e
            })?;
            tracing::info!("Connected to Redis cache store");
            Box::new(store)
        }
        t => {
            return Err(StorageError::Storage(format!(
                "Unsupported cache store type: {t}. Supported types are 'memory' and 'redis'"
            )));
        }
    };

    Ok(Arc::new(Mutex::new(store)))
}
