//! Key/value persistence visible to every instance of a session.
//!
//! Plain last-write-wins: there is no compare-and-swap, so two instances
//! doing read-modify-write on the same key in the same interval can lose one
//! of the writes. Ownership transfer and registry updates both live with that.

mod directory_store;
#[cfg(test)]
mod failing_store;
mod memory_store;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use directory_store::DirectoryStore;
pub use memory_store::MemoryStore;
#[cfg(test)]
pub(crate) use failing_store::FailingReads;

use crate::log;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
    InvalidKey(String),
    Poisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "IO error: {}", e),
            StoreError::Serialize(e) => write!(f, "Serialization error: {}", e),
            StoreError::InvalidKey(key) => write!(f, "Invalid store key: {:?}", key),
            StoreError::Poisoned => write!(f, "Store lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialize(e)
    }
}

pub trait SharedStore: Send + Sync {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Typed access on top of the raw string values. Records are stored as JSON.
pub trait StoreExt {
    /// Absent and malformed values read as `Ok(None)`. A failing backend is
    /// an error: the caller must not mistake it for an empty session.
    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError>;
    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError>;
}

impl<S: SharedStore + ?Sized> StoreExt for S {
    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log!("Malformed value under '{}', treating as absent: {}", key, e);
                Ok(None)
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, &raw)
    }
}
