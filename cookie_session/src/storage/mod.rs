mod cache_store;
mod errors;
mod session_store;
mod types;

pub use cache_store::{
    CacheStore, InMemoryCacheStore, RedisCacheStore, SharedCacheStore, init_cache_store,
    memory_cache_store,
};
pub use errors::StorageError;
pub use session_store::CacheSessionStore;
pub use types::{CacheData, SessionRecord};
