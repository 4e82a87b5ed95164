//! Property-based tests for the response cache and cooldown.

use std::sync::Arc;
use std::time::Duration;

use nexus_core::ManualClock;
use nexus_storage::{
    BudgetStore, FailureCooldown, Freshness, KeyValueStore, LmdbStore, ResponseCache, SessionStore,
};
use proptest::prelude::*;
use tempfile::TempDir;

fn session_cache(prefix: &str) -> (ResponseCache, Arc<SessionStore>, Arc<ManualClock>) {
    let store = Arc::new(SessionStore::new());
    let clock = Arc::new(ManualClock::starting_now());
    let cache = ResponseCache::new(store.clone(), clock.clone(), prefix);
    (cache, store, clock)
}

proptest! {
    /// An entry is served iff its age is strictly below the ttl.
    #[test]
    fn prop_expiry_law(ttl_secs in 1u64..3600, age_secs in 0u64..7200, payload in ".*") {
        let (cache, _store, clock) = session_cache("nexus");
        cache.put("feed", &payload).expect("put");
        clock.advance(Duration::from_secs(age_secs));

        let read = cache.get::<String>("feed", Freshness::best_effort(Duration::from_secs(ttl_secs)));
        prop_assert_eq!(read.is_some(), age_secs < ttl_secs);
        if let Some(read) = read {
            prop_assert_eq!(read.into_value(), payload);
        }
    }

    /// Two caches with different prefixes over one store never see each other.
    #[test]
    fn prop_namespace_isolation(key in "[a-z_]{1,16}", a in any::<u32>(), b in any::<u32>()) {
        let store = Arc::new(SessionStore::new());
        let clock = Arc::new(ManualClock::starting_now());
        let left = ResponseCache::new(store.clone(), clock.clone(), "left");
        let right = ResponseCache::new(store.clone(), clock.clone(), "right");
        let fresh = Freshness::best_effort(Duration::from_secs(60));

        left.put(&key, &a).expect("put left");
        prop_assert!(right.get::<u32>(&key, fresh).is_none());

        right.put(&key, &b).expect("put right");
        prop_assert_eq!(left.get::<u32>(&key, fresh).map(|r| r.into_value()), Some(a));
        prop_assert_eq!(right.get::<u32>(&key, fresh).map(|r| r.into_value()), Some(b));
    }

    /// Arbitrary garbage under a cache key reads as absent, never panics.
    #[test]
    fn prop_garbage_is_absent(garbage in ".*") {
        let (cache, store, _clock) = session_cache("nexus");
        store.set("nexus:feed", &garbage).expect("seed");
        let _ = cache.get::<Vec<String>>("feed", Freshness::best_effort(Duration::from_secs(60)));
    }

    #[test]
    fn prop_cooldown_window(window_secs in 1u64..600, elapsed_secs in 0u64..1200) {
        let store = Arc::new(SessionStore::new());
        let clock = Arc::new(ManualClock::starting_now());
        let cooldown = FailureCooldown::new(
            store,
            clock.clone(),
            "cooldown",
            Duration::from_secs(window_secs),
        );
        cooldown.trip().expect("trip");
        clock.advance(Duration::from_secs(elapsed_secs));
        prop_assert_eq!(cooldown.is_active(), elapsed_secs < window_secs);
    }
}

#[test]
fn test_cache_over_lmdb() {
    let dir = TempDir::new().expect("temp dir");
    let store = Arc::new(LmdbStore::open(dir.path(), 4).expect("open"));
    let clock = Arc::new(ManualClock::starting_now());
    let cache = ResponseCache::new(store, clock, "nexus");

    cache.put("feed", &vec![1, 2, 3]).expect("put");
    let read = cache
        .get::<Vec<i32>>("feed", Freshness::best_effort(Duration::from_secs(60)))
        .expect("hit");
    assert_eq!(read.into_value(), vec![1, 2, 3]);
}

#[test]
fn test_budget_survives_reopen() {
    let dir = TempDir::new().expect("temp dir");
    {
        let store: Arc<dyn KeyValueStore> = Arc::new(LmdbStore::open(dir.path(), 4).expect("open"));
        BudgetStore::new(store).set_actual("3", 5000.0).expect("set");
    }
    let store: Arc<dyn KeyValueStore> = Arc::new(LmdbStore::open(dir.path(), 4).expect("reopen"));
    let items = BudgetStore::new(store).load();
    assert_eq!(items[2].actual, 5000.0);
    assert_eq!(items[2].progress(), 100.0);
}
