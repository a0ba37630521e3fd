use thiserror::Error;

use crate::session::types::BindingDimension;
use crate::storage::StorageError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// The record is bound to a different domain or path than the one configured.
    #[error("session bound to {dimension}, we got \"{got}\", but expected \"{expected}\"")]
    Binding {
        dimension: BindingDimension,
        got: String,
        expected: String,
    },

    #[error("key \"{0}\" not available in session")]
    KeyNotFound(String),

    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid session value: {0}")]
    Value(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}
