mod config;
mod memory;
mod redis;
mod types;

pub use config::{SharedCacheStore, init_cache_store, memory_cache_store};
pub use types::{CacheStore, InMemoryCacheStore, RedisCacheStore};
