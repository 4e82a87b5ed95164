//! Key-value store abstraction.
//!
//! Values are opaque strings (JSON in practice). Two backends:
//! [`SessionStore`] lives for the process, [`crate::LmdbStore`] survives it.

use nexus_core::{NexusResult, StorageError};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

/// Minimal string key-value store.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    fn get(&self, key: &str) -> NexusResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> NexusResult<()>;

    /// Remove `key`; returns whether it existed.
    fn remove(&self, key: &str) -> NexusResult<bool>;
}

/// In-memory, session-scoped store.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry, as when a browsing session ends.
    pub fn clear(&self) -> NexusResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::LockPoisoned)?;
        entries.clear();
        Ok(())
    }
}

impl KeyValueStore for SessionStore {
    fn get(&self, key: &str) -> NexusResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> NexusResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> NexusResult<bool> {
        let mut entries = self.entries.write().map_err(|_| StorageError::LockPoisoned)?;
        Ok(entries.remove(key).is_some())
    }
}
