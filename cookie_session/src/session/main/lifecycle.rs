use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cookie::Cookie;
use crate::header::HeaderTransport;
use crate::session::errors::SessionError;
use crate::session::store::SessionStore;
use crate::session::types::{BindingDimension, CANARY_KEY, EXPIRY_KEY, SessionOptions};

/// Encode a timestamp the way reserved record keys store it.
pub(crate) fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339())
}

fn is_past(start: DateTime<Utc>, lifetime: Duration, now: DateTime<Utc>) -> bool {
    start
        .checked_add_signed(lifetime)
        .is_some_and(|deadline| now > deadline)
}

/// A cookie-bound session for the lifetime of one request.
///
/// Created with [`Session::attach`], which resumes or creates the record,
/// rotates the identifier when the canary is stale, enforces the configured
/// domain/path bindings, discards records past their absolute lifetime and
/// queues the identifier cookie on the response headers.
///
/// # Example
///
/// ```
/// use cookie_session::{
///     CacheSessionStore, HeaderList, HeaderTransport, Session, SessionOptions, memory_cache_store,
/// };
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), cookie_session::SessionError> {
/// let store = CacheSessionStore::new(memory_cache_store(), None);
/// let mut session = Session::attach(SessionOptions::default(), store, HeaderList::new()).await?;
///
/// session.set("user", "alice").await?;
/// assert_eq!(session.get::<String>("user").await?, "alice");
/// assert_eq!(session.headers().list_all().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session<S, H> {
    options: SessionOptions,
    cookie: Cookie<H>,
    store: S,
    id: String,
    /// Identifiers this session held before the current one.
    superseded: Vec<String>,
}

impl<S, H> Session<S, H>
where
    S: SessionStore,
    H: HeaderTransport,
{
    /// Attach to the session the store resumes, applying rotation, binding
    /// and expiry policies before the identifier cookie is queued.
    ///
    /// # Errors
    ///
    /// * [`SessionError::Binding`] when the record is bound to another domain or path
    /// * [`SessionError::StoreUnavailable`] when the store cannot start or persist
    #[tracing::instrument(skip_all, fields(name))]
    pub async fn attach(
        options: SessionOptions,
        mut store: S,
        headers: H,
    ) -> Result<Self, SessionError> {
        if let Some(name) = &options.session_name {
            store.set_name(name.clone());
        }
        tracing::Span::current().record("name", store.name());

        if !store.is_active() {
            store.start().await?;
        }

        let id = store
            .current_id()
            .ok_or_else(|| {
                SessionError::StoreUnavailable("store started without a session id".to_string())
            })?
            .to_string();

        let cookie = Cookie::new(options.cookie.clone(), headers);
        let mut session = Self {
            options,
            cookie,
            store,
            id,
            superseded: Vec::new(),
        };

        let now = Utc::now();
        session.check_canary(now).await?;
        session.check_binding(BindingDimension::Domain).await?;
        session.check_binding(BindingDimension::Path).await?;
        session.check_expiry(now).await?;

        session.emit_id();
        Ok(session)
    }

    /// Current session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name of the identifier cookie.
    pub fn name(&self) -> &str {
        self.store.name()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Header lines queued so far.
    pub fn headers(&self) -> &H {
        self.cookie.headers()
    }

    /// Mutable access to the queued lines, e.g. to flush them onto a response.
    pub fn headers_mut(&mut self) -> &mut H {
        self.cookie.headers_mut()
    }

    pub fn into_parts(self) -> (S, H) {
        (self.store, self.cookie.into_headers())
    }

    /// Issue a new identifier for the same record and queue its cookie.
    pub async fn regenerate(&mut self, delete_old: bool) -> Result<(), SessionError> {
        let new_id = self.store.regenerate_id(delete_old).await?;
        let old_id = std::mem::replace(&mut self.id, new_id);
        tracing::debug!(delete_old, "Session id regenerated");
        self.superseded.push(old_id);
        self.emit_id();
        Ok(())
    }

    pub async fn set<T>(&mut self, key: &str, value: &T) -> Result<(), SessionError>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value).map_err(|e| SessionError::Value(e.to_string()))?;
        self.store.set(&self.id, key, value).await
    }

    /// Fails with [`SessionError::KeyNotFound`] when `key` is absent.
    pub async fn get<T>(&self, key: &str) -> Result<T, SessionError>
    where
        T: DeserializeOwned,
    {
        let value = self.get_value(key).await?;
        serde_json::from_value(value).map_err(|e| SessionError::Value(e.to_string()))
    }

    pub async fn get_value(&self, key: &str) -> Result<Value, SessionError> {
        self.store
            .get(&self.id, key)
            .await?
            .ok_or_else(|| SessionError::KeyNotFound(key.to_string()))
    }

    pub async fn has(&self, key: &str) -> Result<bool, SessionError> {
        Ok(self.store.get(&self.id, key).await?.is_some())
    }

    /// Remove `key`. Removing an absent key succeeds.
    pub async fn delete(&mut self, key: &str) -> Result<(), SessionError> {
        self.store.delete(&self.id, key).await
    }

    /// Empty the record and move to a new identifier, invalidating the old one.
    ///
    /// The fresh record is seeded right away, so it is never observed without
    /// its canary and expiry timestamps.
    pub async fn destroy(&mut self) -> Result<(), SessionError> {
        self.store.clear_all(&self.id).await?;
        self.regenerate(true).await?;
        self.seed_record(Utc::now()).await?;
        tracing::debug!("Session destroyed");
        Ok(())
    }

    async fn check_canary(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        let canary = self.read_timestamp(CANARY_KEY).await?;
        let expiry = self.read_timestamp(EXPIRY_KEY).await?;

        match (canary, expiry) {
            (Some(canary), Some(_)) => {
                if is_past(canary, self.options.canary_expiry, now) {
                    tracing::debug!("Canary expired, rotating session id");
                    self.regenerate(true).await?;
                    self.write_timestamp(CANARY_KEY, now).await?;
                }
            }
            _ => {
                tracing::debug!("Session record not initialized, starting a fresh one");
                self.store.clear_all(&self.id).await?;
                self.regenerate(true).await?;
                self.seed_record(now).await?;
            }
        }
        Ok(())
    }

    async fn check_binding(&mut self, dimension: BindingDimension) -> Result<(), SessionError> {
        let Some(expected) = self.options.binding(dimension).map(str::to_string) else {
            return Ok(());
        };

        match self.store.get(&self.id, dimension.key()).await? {
            None => {
                tracing::debug!(%dimension, "Binding session to {}", expected);
                self.store
                    .set(&self.id, dimension.key(), Value::String(expected))
                    .await
            }
            Some(stored) => {
                let got = match stored {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                if got == expected {
                    Ok(())
                } else {
                    tracing::warn!(%dimension, "Session binding mismatch: got {}, expected {}", got, expected);
                    Err(SessionError::Binding {
                        dimension,
                        got,
                        expected,
                    })
                }
            }
        }
    }

    async fn check_expiry(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        let Some(lifetime) = self.options.session_expiry else {
            return Ok(());
        };
        let Some(created) = self.read_timestamp(EXPIRY_KEY).await? else {
            return Ok(());
        };

        if is_past(created, lifetime, now) {
            tracing::debug!("Session past its absolute lifetime, destroying");
            self.destroy().await?;
        }
        Ok(())
    }

    /// Write the reserved keys of a fresh record.
    async fn seed_record(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.write_timestamp(CANARY_KEY, now).await?;
        self.write_timestamp(EXPIRY_KEY, now).await?;

        for dimension in [BindingDimension::Domain, BindingDimension::Path] {
            if let Some(bound) = self.options.binding(dimension).map(str::to_string) {
                self.store
                    .set(&self.id, dimension.key(), Value::String(bound))
                    .await?;
            }
        }
        Ok(())
    }

    async fn read_timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>, SessionError> {
        let Some(value) = self.store.get(&self.id, key).await? else {
            return Ok(None);
        };

        match serde_json::from_value::<DateTime<Utc>>(value) {
            Ok(at) => Ok(Some(at)),
            Err(e) => {
                tracing::warn!("Ignoring undecodable {} timestamp: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn write_timestamp(&mut self, key: &str, at: DateTime<Utc>) -> Result<(), SessionError> {
        self.store.set(&self.id, key, timestamp_value(at)).await
    }

    /// Queue the identifier cookie, dropping lines for earlier identifiers.
    fn emit_id(&mut self) {
        let name = self.store.name().to_string();
        self.cookie.supersede(&name, &self.superseded, &self.id);
    }
}
