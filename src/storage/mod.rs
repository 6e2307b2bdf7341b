//! Durable key/value storage backends and the token store built on them.
//!
//! SYSTEM CONTEXT
//! ==============
//! `token_store` is the only consumer. Backends report failures honestly via
//! [`StorageError`]; the token store decides how to degrade.

pub mod file;
pub mod token_store;

#[cfg(feature = "hydrate")]
pub mod browser;

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage contents are corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A string key/value slot store (browser `localStorage`, a file, memory).
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key` if present.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage. Lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().map_err(|_| poisoned())?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| poisoned())?;
        items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| poisoned())?;
        items.remove(key);
        Ok(())
    }
}

fn poisoned() -> StorageError {
    StorageError::Unavailable("memory storage lock poisoned".to_owned())
}
