//! Flat key-value persistence for interview progress and candidate results.
//!
//! Every record is a whole JSON blob under a fixed key. Reads that fail to
//! deserialize are treated as "no data" so a corrupt file never blocks the
//! flow.

pub mod candidates;
pub mod file;
#[cfg(test)]
pub mod memory;
pub mod session;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::warn;

pub const SESSION_KEY: &str = "interview_session";
pub const CANDIDATES_KEY: &str = "interviewer_candidates";
pub const LAST_RESULT_KEY: &str = "interview_result";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

/// Raw string storage addressed by key. Implementations replace the whole
/// value on every `set`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Reads and deserializes a record, returning `None` for missing, unreadable
/// or corrupt data.
pub(crate) fn read_record<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!("Failed to read '{key}': {e}");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Discarding corrupt record '{key}': {e}");
            None
        }
    }
}

pub(crate) fn write_record<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
