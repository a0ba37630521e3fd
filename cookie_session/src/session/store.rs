use async_trait::async_trait;
use serde_json::Value;

use crate::session::errors::SessionError;

/// Persistent key/value records keyed by session identifier.
///
/// One instance serves one request: it knows which identifier the request
/// arrived with and which identifier is current. It is the single source of
/// truth for both the current identifier and the record contents.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Built-in name of the identifier cookie.
    fn name(&self) -> &str;

    fn set_name(&mut self, name: String);

    /// Current identifier, `None` until [`SessionStore::start`] succeeded.
    fn current_id(&self) -> Option<&str>;

    fn is_active(&self) -> bool;

    /// Make a record available, resuming the inbound one when possible.
    async fn start(&mut self) -> Result<(), SessionError>;

    /// Move the current record to a new identifier and return it.
    ///
    /// With `delete_old` the previous identifier can no longer be resumed.
    async fn regenerate_id(&mut self, delete_old: bool) -> Result<String, SessionError>;

    async fn get(&self, session_id: &str, key: &str) -> Result<Option<Value>, SessionError>;

    async fn set(&mut self, session_id: &str, key: &str, value: Value)
    -> Result<(), SessionError>;

    /// Remove `key` from the record. Removing an absent key is not an error.
    async fn delete(&mut self, session_id: &str, key: &str) -> Result<(), SessionError>;

    /// Empty the record, keeping the identifier.
    async fn clear_all(&mut self, session_id: &str) -> Result<(), SessionError>;
}
