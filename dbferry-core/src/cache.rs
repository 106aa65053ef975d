//! Single-entry cache with time-to-live expiry.
//!
//! Holds one value plus the instant it was last refreshed. The value is
//! stale once the TTL elapses or after an explicit [`TtlCache::clear`].
//! Owners inject an instance instead of relying on module-level state, so
//! each adapter (and each test) gets its own scope.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Slot<T> {
    value: T,
    refreshed_at: Instant,
}

/// Thread-safe single-value cache with TTL invalidation.
///
/// # Example
/// ```rust
/// use dbferry_core::cache::TtlCache;
/// use std::time::Duration;
///
/// let cache = TtlCache::new(Duration::from_secs(60));
/// assert!(cache.get().is_none());
///
/// cache.insert(vec!["users".to_string()]);
/// assert_eq!(cache.get(), Some(vec!["users".to_string()]));
///
/// cache.clear();
/// assert!(cache.get().is_none());
/// ```
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Mutex<Option<Slot<T>>>,
}

impl<T: Clone> TtlCache<T> {
    /// Creates an empty cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value if present and not expired.
    pub fn get(&self) -> Option<T> {
        let guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|slot| slot.refreshed_at.elapsed() < self.ttl)
            .map(|slot| slot.value.clone())
    }

    /// Stores a value and resets the refresh instant.
    pub fn insert(&self, value: T) {
        let mut guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(Slot {
            value,
            refreshed_at: Instant::now(),
        });
    }

    /// Drops the cached value regardless of age.
    pub fn clear(&self) {
        let mut guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    /// Instant of the last refresh, even if the entry has since expired.
    pub fn last_refresh(&self) -> Option<Instant> {
        let guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().map(|slot| slot.refreshed_at)
    }
}
