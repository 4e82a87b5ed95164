//! Freshness contracts for cache reads.
//!
//! Callers state their staleness tolerance on every read, and every read
//! reports how old the returned value is.

use nexus_core::clock::elapsed_since;
use nexus_core::Timestamp;
use std::time::Duration;

/// Freshness requirement for a cache read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Accept a cached value younger than `max_staleness`.
    BestEffort { max_staleness: Duration },

    /// Never serve from cache; the caller always goes to the source.
    #[default]
    Live,
}

impl Freshness {
    pub fn best_effort(max_staleness: Duration) -> Self {
        Self::BestEffort { max_staleness }
    }

    pub fn live() -> Self {
        Self::Live
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// Max staleness for BestEffort, zero for Live.
    pub fn max_staleness(&self) -> Duration {
        match self {
            Self::BestEffort { max_staleness } => *max_staleness,
            Self::Live => Duration::ZERO,
        }
    }

    /// Whether a value of the given age satisfies this requirement.
    ///
    /// An entry exactly `max_staleness` old is already expired.
    pub fn accepts(&self, age: Duration) -> bool {
        match self {
            Self::BestEffort { max_staleness } => age < *max_staleness,
            Self::Live => false,
        }
    }
}

/// Result of a cache read, carrying staleness metadata.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    value: T,
    stored_at: Timestamp,
    read_at: Timestamp,
    was_cache_hit: bool,
}

impl<T> CacheRead<T> {
    /// A value served from the cache.
    pub fn from_cache(value: T, stored_at: Timestamp, read_at: Timestamp) -> Self {
        Self {
            value,
            stored_at,
            read_at,
            was_cache_hit: true,
        }
    }

    /// A value fetched from the source just now.
    pub fn from_source(value: T, fetched_at: Timestamp) -> Self {
        Self {
            value,
            stored_at: fetched_at,
            read_at: fetched_at,
            was_cache_hit: false,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn stored_at(&self) -> Timestamp {
        self.stored_at
    }

    /// Age of the value at the moment it was read.
    pub fn staleness(&self) -> Duration {
        elapsed_since(self.read_at, self.stored_at)
    }

    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> CacheRead<U> {
        CacheRead {
            value: f(self.value),
            stored_at: self.stored_at,
            read_at: self.read_at,
            was_cache_hit: self.was_cache_hit,
        }
    }
}
