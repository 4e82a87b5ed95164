//! Nexus Storage - Key-Value Stores, Response Cache and Cooldown
//!
//! Everything the gateway persists goes through [`KeyValueStore`]: the
//! session-scoped [`SessionStore`] holds cache entries and cooldown markers,
//! the durable [`LmdbStore`] holds the budget ledger.

pub mod budget;
pub mod cache;
pub mod cooldown;
pub mod kv;
pub mod lmdb;

pub use budget::{default_budget, total_actual, total_estimated, BudgetStore};
pub use cache::{CacheEntry, CacheRead, CacheStats, Freshness, ResponseCache};
pub use cooldown::{CooldownMarker, FailureCooldown};
pub use kv::{KeyValueStore, SessionStore};
pub use lmdb::{LmdbStore, LmdbStoreError};
