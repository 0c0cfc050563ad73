//! Local key-value storage for tracker state.
//!
//! Values are opaque strings. [`FileStore`] keeps one file per key in the
//! application data directory; [`MemoryStore`] lives only as long as the
//! process. Both are last-writer-wins.

use crate::libs::data_storage::DataStorage;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage location unavailable: {0}")]
    Location(String),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

pub struct FileStore {
    storage: DataStorage,
}

impl FileStore {
    pub fn new(storage: DataStorage) -> Self {
        Self { storage }
    }

    fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        self.storage
            .get_path(&format!("{}.json", key))
            .map_err(|e| StoreError::Location(e.to_string()))
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::write(self.path(key)?, value)?;
        Ok(())
    }
}

/// Process-local store. Clones share their contents.
#[derive(Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
