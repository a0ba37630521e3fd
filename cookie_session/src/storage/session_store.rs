use async_trait::async_trait;
use serde_json::Value;

use crate::config::{SESSION_COOKIE_NAME, SESSION_STORE_TTL_SECS};
use crate::session::{SessionError, SessionStore};
use crate::storage::cache_store::SharedCacheStore;
use crate::storage::types::{CacheData, SessionRecord};
use crate::utils::{gen_random_string, is_well_formed_id};

const SESSION_PREFIX: &str = "session";
const SESSION_ID_BYTES: usize = 32;
const MAX_INBOUND_ID_LEN: usize = 128;
const ID_COLLISION_ATTEMPTS: usize = 3;

/// [`SessionStore`] over a shared [`CacheStore`](crate::CacheStore).
///
/// Created per request with the identifier the client presented, if any.
/// An inbound identifier is only resumed when a record exists for it; anything
/// else gets a freshly minted identifier.
pub struct CacheSessionStore {
    cache: SharedCacheStore,
    name: String,
    inbound_id: Option<String>,
    current_id: Option<String>,
    ttl: usize,
}

impl CacheSessionStore {
    pub fn new(cache: SharedCacheStore, inbound_id: Option<String>) -> Self {
        Self {
            cache,
            name: SESSION_COOKIE_NAME.clone(),
            inbound_id,
            current_id: None,
            ttl: usize::try_from(*SESSION_STORE_TTL_SECS).unwrap_or(usize::MAX),
        }
    }

    /// Override the record TTL in seconds. Zero keeps records forever.
    pub fn with_ttl(mut self, ttl_secs: usize) -> Self {
        self.ttl = ttl_secs;
        self
    }

    async fn load(&self, session_id: &str) -> Result<Option<SessionRecord>, SessionError> {
        let data = self.cache.lock().await.get(SESSION_PREFIX, session_id).await?;
        Ok(data.map(SessionRecord::try_from).transpose()?)
    }

    async fn save(&self, session_id: &str, record: SessionRecord) -> Result<(), SessionError> {
        let data = CacheData::try_from(record)?;
        self.cache
            .lock()
            .await
            .put_with_ttl(SESSION_PREFIX, session_id, data, self.ttl)
            .await?;
        Ok(())
    }

    /// Store `record` under a freshly generated identifier.
    async fn mint_id(&self, record: SessionRecord) -> Result<String, SessionError> {
        self.claim_id(record, || Ok(gen_random_string(SESSION_ID_BYTES)?))
            .await
    }

    /// Write `record` under the first candidate from `next_id` that is not
    /// taken yet. The write itself is the collision check.
    async fn claim_id<F>(
        &self,
        record: SessionRecord,
        mut next_id: F,
    ) -> Result<String, SessionError>
    where
        F: FnMut() -> Result<String, SessionError> + Send,
    {
        let data = CacheData::try_from(record)?;

        for attempt in 1..=ID_COLLISION_ATTEMPTS {
            let candidate = next_id()?;
            let inserted = self
                .cache
                .lock()
                .await
                .put_if_not_exists(SESSION_PREFIX, &candidate, data.clone(), self.ttl)
                .await?;
            if inserted {
                return Ok(candidate);
            }
            tracing::warn!(
                "Session id collision on attempt {}, generating another one",
                attempt
            );
        }
        Err(SessionError::StoreUnavailable(format!(
            "failed to claim an unused session id after {ID_COLLISION_ATTEMPTS} attempts"
        )))
    }

    fn require_started(&self) -> Result<&str, SessionError> {
        self.current_id
            .as_deref()
            .ok_or_else(|| SessionError::StoreUnavailable("session not started".to_string()))
    }
}

#[async_trait]
impl SessionStore for CacheSessionStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    fn is_active(&self) -> bool {
        self.current_id.is_some()
    }

    async fn start(&mut self) -> Result<(), SessionError> {
        if let Some(inbound) = self.inbound_id.take() {
            if is_well_formed_id(&inbound, MAX_INBOUND_ID_LEN) && self.load(&inbound).await?.is_some()
            {
                tracing::debug!("Resuming existing session");
                self.current_id = Some(inbound);
                return Ok(());
            }
            tracing::debug!("Inbound session id unknown or malformed, issuing a new one");
        }

        let session_id = self.mint_id(SessionRecord::default()).await?;
        self.current_id = Some(session_id);
        Ok(())
    }

    async fn regenerate_id(&mut self, delete_old: bool) -> Result<String, SessionError> {
        let old_id = self.require_started()?.to_string();
        let record = self.load(&old_id).await?.unwrap_or_default();

        let new_id = self.mint_id(record).await?;

        if delete_old {
            self.cache
                .lock()
                .await
                .remove(SESSION_PREFIX, &old_id)
                .await?;
        }

        self.current_id = Some(new_id.clone());
        Ok(new_id)
    }

    async fn get(&self, session_id: &str, key: &str) -> Result<Option<Value>, SessionError> {
        Ok(self
            .load(session_id)
            .await?
            .and_then(|mut record| record.entries.remove(key)))
    }

    async fn set(
        &mut self,
        session_id: &str,
        key: &str,
        value: Value,
    ) -> Result<(), SessionError> {
        let mut record = self.load(session_id).await?.unwrap_or_default();
        record.entries.insert(key.to_string(), value);
        self.save(session_id, record).await
    }

    async fn delete(&mut self, session_id: &str, key: &str) -> Result<(), SessionError> {
        let Some(mut record) = self.load(session_id).await? else {
            return Ok(());
        };
        if record.entries.remove(key).is_some() {
            self.save(session_id, record).await?;
        }
        Ok(())
    }

    async fn clear_all(&mut self, session_id: &str) -> Result<(), SessionError> {
        self.save(session_id, SessionRecord::default()).await
    }
}
