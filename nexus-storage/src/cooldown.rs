//! Rate-limit cooldown marker.
//!
//! After a rate-limited background fetch the marker is tripped; while it is
//! active dependent calls skip the network entirely.

use std::sync::Arc;
use std::time::Duration;

use nexus_core::clock::elapsed_since;
use nexus_core::{Clock, NexusResult, StorageError, Timestamp};
use serde::{Deserialize, Serialize};

use crate::kv::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownMarker {
    pub triggered_at: Timestamp,
}

#[derive(Debug)]
pub struct FailureCooldown {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    window: Duration,
}

impl FailureCooldown {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        key: impl Into<String>,
        window: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            key: key.into(),
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a rate-limit failure at the current time.
    pub fn trip(&self) -> NexusResult<()> {
        let marker = CooldownMarker {
            triggered_at: self.clock.now(),
        };
        let raw = serde_json::to_string(&marker).map_err(|e| StorageError::Serialization {
            key: self.key.clone(),
            reason: e.to_string(),
        })?;
        self.store.set(&self.key, &raw)?;
        tracing::info!(key = %self.key, window_ms = self.window.as_millis() as u64, "Cooldown tripped");
        Ok(())
    }

    fn marker(&self) -> Option<CooldownMarker> {
        let raw = match self.store.get(&self.key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Cooldown marker read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(marker) => Some(marker),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Ignoring undecodable cooldown marker");
                None
            }
        }
    }

    /// Time left in the window, `None` when inactive.
    pub fn remaining(&self) -> Option<Duration> {
        let marker = self.marker()?;
        let elapsed = elapsed_since(self.clock.now(), marker.triggered_at);
        self.window.checked_sub(elapsed).filter(|left| !left.is_zero())
    }

    pub fn is_active(&self) -> bool {
        self.remaining().is_some()
    }
}
