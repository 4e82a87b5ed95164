//! Injectable wall clock.
//!
//! Cache expiry and cooldown windows are computed against a [`Clock`] so
//! tests can drive time explicitly with [`ManualClock`].

use crate::Timestamp;
use chrono::Utc;
use std::fmt;
use std::sync::RwLock;
use std::time::Duration;

/// Source of the current time.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Timestamp;
}

/// Real UTC wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Start at the current wall-clock time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let delta = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::MAX);
        if let Ok(mut guard) = self.now.write() {
            *guard = guard.checked_add_signed(delta).unwrap_or(*guard);
        }
    }

    pub fn set(&self, at: Timestamp) {
        if let Ok(mut guard) = self.now.write() {
            *guard = at;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_now()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Elapsed time from `earlier` to `now`, zero if `earlier` is in the future.
pub fn elapsed_since(now: Timestamp, earlier: Timestamp) -> Duration {
    now.signed_duration_since(earlier)
        .to_std()
        .unwrap_or(Duration::ZERO)
}
