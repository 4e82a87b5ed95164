//! Response cache with explicit freshness.
//!
//! Callers state their staleness tolerance via [`Freshness`] and receive a
//! [`CacheRead<T>`] that says how old the value is and whether it came from
//! the cache.
//!
//! # Example
//!
//! ```ignore
//! let read = cache.get::<Vec<TrendingItem>>(
//!     PULSE_CACHE_KEY,
//!     Freshness::best_effort(Duration::from_secs(900)),
//! );
//! if let Some(read) = read {
//!     tracing::debug!(staleness_ms = read.staleness().as_millis() as u64, "Serving cached feed");
//! }
//! ```

pub mod freshness;
pub mod response_cache;

pub use freshness::{CacheRead, Freshness};
pub use response_cache::{CacheEntry, CacheStats, ResponseCache};
