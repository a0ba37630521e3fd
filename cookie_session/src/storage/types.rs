use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::errors::StorageError;

/// Data stored in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheData {
    pub value: String,
}

/// Everything persisted for one session identifier: application entries
/// plus the reserved lifecycle keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub entries: HashMap<String, Value>,
}

impl TryFrom<SessionRecord> for CacheData {
    type Error = StorageError;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            value: serde_json::to_string(&record)?,
        })
    }
}

impl TryFrom<CacheData> for SessionRecord {
    type Error = StorageError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        Ok(serde_json::from_str(&data.value)?)
    }
}
