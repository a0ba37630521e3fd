//! Test utilities for session lifecycle tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::header::HeaderTransport;
use crate::session::errors::SessionError;
use crate::session::main::lifecycle::{Session, timestamp_value};
use crate::session::store::SessionStore;
use crate::session::types::SessionOptions;
use crate::storage::{CacheData, CacheSessionStore, CacheStore, SharedCacheStore, StorageError};

/// Store for a request that presented `inbound` as its session cookie.
pub(crate) fn request_store(cache: &SharedCacheStore, inbound: Option<&str>) -> CacheSessionStore {
    CacheSessionStore::new(cache.clone(), inbound.map(str::to_string))
}

/// Attach a session for a request carrying `inbound`.
pub(crate) async fn attach_request<H: HeaderTransport>(
    cache: &SharedCacheStore,
    inbound: Option<&str>,
    options: SessionOptions,
    headers: H,
) -> Result<Session<CacheSessionStore, H>, SessionError> {
    Session::attach(options, request_store(cache, inbound), headers).await
}

/// Write a record key directly, bypassing the lifecycle manager.
pub(crate) async fn write_record_key(
    cache: &SharedCacheStore,
    session_id: &str,
    key: &str,
    value: Value,
) {
    request_store(cache, None)
        .set(session_id, key, value)
        .await
        .expect("Failed to write record key");
}

/// Move a reserved timestamp to `at`.
pub(crate) async fn backdate(
    cache: &SharedCacheStore,
    session_id: &str,
    key: &str,
    at: DateTime<Utc>,
) {
    write_record_key(cache, session_id, key, timestamp_value(at)).await;
}

pub(crate) async fn remove_record_key(cache: &SharedCacheStore, session_id: &str, key: &str) {
    request_store(cache, None)
        .delete(session_id, key)
        .await
        .expect("Failed to remove record key");
}

pub(crate) async fn read_record_key(
    cache: &SharedCacheStore,
    session_id: &str,
    key: &str,
) -> Option<Value> {
    request_store(cache, None)
        .get(session_id, key)
        .await
        .expect("Failed to read record key")
}

/// The line a session cookie with default attributes renders to.
pub(crate) fn default_cookie_line(name: &str, id: &str) -> String {
    format!("Set-Cookie: {name}={id}; Secure; HttpOnly; SameSite=Strict")
}

/// Cache whose backend is unreachable: every operation fails.
pub(crate) struct UnreachableCacheStore;

fn unreachable() -> StorageError {
    StorageError::Storage("connection refused".to_string())
}

#[async_trait]
impl CacheStore for UnreachableCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Err(unreachable())
    }

    async fn put(&mut self, _: &str, _: &str, _: CacheData) -> Result<(), StorageError> {
        Err(unreachable())
    }

    async fn put_with_ttl(
        &mut self,
        _: &str,
        _: &str,
        _: CacheData,
        _: usize,
    ) -> Result<(), StorageError> {
        Err(unreachable())
    }

    async fn put_if_not_exists(
        &mut self,
        _: &str,
        _: &str,
        _: CacheData,
        _: usize,
    ) -> Result<bool, StorageError> {
        Err(unreachable())
    }

    async fn get(&self, _: &str, _: &str) -> Result<Option<CacheData>, StorageError> {
        Err(unreachable())
    }

    async fn remove(&mut self, _: &str, _: &str) -> Result<(), StorageError> {
        Err(unreachable())
    }
}

/// Swap the backend behind `cache` for one that is down.
pub(crate) async fn take_cache_down(cache: &SharedCacheStore) {
    *cache.lock().await = Box::new(UnreachableCacheStore);
}
