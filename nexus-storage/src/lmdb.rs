//! LMDB-backed durable store.
//!
//! Uses heed with a single unnamed database of UTF-8 keys and values.
//! Reads run in a read transaction, writes each in their own committed
//! write transaction.

use std::fmt;
use std::path::{Path, PathBuf};

use heed::types::Str;
use heed::{Database, Env, EnvOpenOptions};
use nexus_core::{NexusError, NexusResult, StorageError};

use crate::kv::KeyValueStore;

/// Error type for LMDB store operations.
#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    #[error("Failed to open database: {0}")]
    DbOpen(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbStoreError> for NexusError {
    fn from(e: LmdbStoreError) -> Self {
        NexusError::Storage(StorageError::Backend {
            reason: e.to_string(),
        })
    }
}

fn backend(e: heed::Error) -> NexusError {
    LmdbStoreError::Transaction(e.to_string()).into()
}

/// Durable key-value store in an LMDB environment directory.
pub struct LmdbStore {
    env: Env,
    db: Database<Str, Str>,
    path: PathBuf,
}

impl LmdbStore {
    /// Open (creating if needed) an environment at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created or LMDB refuses to open it.
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, LmdbStoreError> {
        let map_size = max_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| LmdbStoreError::EnvOpen(format!("map size of {}MB overflows", max_size_mb)))?;

        std::fs::create_dir_all(&path)?;

        // SAFETY: each environment directory is opened once per process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbStoreError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;
        let db: Database<Str, Str> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| LmdbStoreError::DbOpen(e.to_string()))?;
        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(Self {
            env,
            db,
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for LmdbStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LmdbStore").field("path", &self.path).finish()
    }
}

impl KeyValueStore for LmdbStore {
    fn get(&self, key: &str) -> NexusResult<Option<String>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        let value = self.db.get(&rtxn, key).map_err(backend)?;
        Ok(value.map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> NexusResult<()> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        self.db.put(&mut wtxn, key, value).map_err(backend)?;
        wtxn.commit().map_err(backend)
    }

    fn remove(&self, key: &str) -> NexusResult<bool> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        let existed = self.db.delete(&mut wtxn, key).map_err(backend)?;
        wtxn.commit().map_err(backend)?;
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (LmdbStore, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let store = LmdbStore::open(dir.path(), 4).expect("open lmdb");
        (store, dir)
    }

    #[test]
    fn test_put_and_get() {
        let (store, _dir) = create_test_store();
        store.set("skoolswap_budget", "[]").expect("set");
        assert_eq!(
            store.get("skoolswap_budget").expect("get").as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_oversized_map_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let err = LmdbStore::open(dir.path().join("huge"), usize::MAX).expect_err("overflow");
        assert!(matches!(err, LmdbStoreError::EnvOpen(_)));
        assert!(!dir.path().join("huge").exists());
    }

    #[test]
    fn test_get_nonexistent() {
        let (store, _dir) = create_test_store();
        assert_eq!(store.get("missing").expect("get"), None);
    }

    #[test]
    fn test_remove() {
        let (store, _dir) = create_test_store();
        store.set("k", "v").expect("set");
        assert!(store.remove("k").expect("remove"));
        assert!(!store.remove("k").expect("remove again"));
        assert_eq!(store.get("k").expect("get"), None);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().expect("temp dir");
        {
            let store = LmdbStore::open(dir.path(), 4).expect("open");
            store.set("k", "durable").expect("set");
        }
        let store = LmdbStore::open(dir.path(), 4).expect("reopen");
        assert_eq!(store.get("k").expect("get").as_deref(), Some("durable"));
    }
}
