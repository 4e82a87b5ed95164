//! Expiring JSON cache over a [`KeyValueStore`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use nexus_core::clock::elapsed_since;
use nexus_core::{Clock, NexusResult, StorageError, Timestamp};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::freshness::{CacheRead, Freshness};
use crate::kv::KeyValueStore;

/// Stored envelope: the payload and when it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub key: String,
    pub payload: T,
    pub stored_at: Timestamp,
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Response cache with injected clock and store.
///
/// Reads never fail: a missing, expired or undecodable entry and a backend
/// error all come back as `None`. Keys are namespaced as `{prefix}:{key}`.
#[derive(Debug)]
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    prefix: String,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResponseCache {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clock,
            prefix: prefix.into(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    fn miss<T>(&self) -> Option<T> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Look up `key`, honouring `freshness`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, freshness: Freshness) -> Option<CacheRead<T>> {
        if freshness.is_live() {
            return self.miss();
        }

        let scoped = self.scoped(key);
        let raw = match self.store.get(&scoped) {
            Ok(Some(raw)) => raw,
            Ok(None) => return self.miss(),
            Err(e) => {
                tracing::warn!(key = %scoped, error = %e, "Cache backend read failed");
                return self.miss();
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key = %scoped, error = %e, "Discarding undecodable cache entry");
                return self.miss();
            }
        };

        let now = self.clock.now();
        if !freshness.accepts(elapsed_since(now, entry.stored_at)) {
            tracing::debug!(key = %scoped, "Cache entry expired");
            return self.miss();
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(CacheRead::from_cache(entry.payload, entry.stored_at, now))
    }

    /// Store `value` under `key`, stamped with the current time.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> NexusResult<()> {
        let scoped = self.scoped(key);
        let entry = CacheEntry {
            key: key.to_string(),
            payload: value,
            stored_at: self.clock.now(),
        };
        let raw = serde_json::to_string(&entry).map_err(|e| StorageError::Serialization {
            key: scoped.clone(),
            reason: e.to_string(),
        })?;
        self.store.set(&scoped, &raw)
    }

    /// Drop the entry for `key`.
    pub fn invalidate(&self, key: &str) -> NexusResult<bool> {
        self.store.remove(&self.scoped(key))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
