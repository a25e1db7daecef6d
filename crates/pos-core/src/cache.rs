//! Time-boxed in-process memoization.
//!
//! [`TtlCache`] backs both the geocode result cache and the store-location
//! cache. Entries expire lazily: a read past the TTL evicts the entry and
//! reports a miss; there is no background sweep and no size bound. The map is
//! guarded by a `Mutex` because the runtime is multi-threaded — get/set never
//! hold the lock across an await point.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

struct Entry<V> {
    stored_at: Instant,
    value: V,
}

pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key`, or `None` if absent or expired.
    /// An expired entry is removed on this read.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Stores `value` under `key`, overwriting unconditionally and stamping
    /// the entry with the current time.
    pub fn set(&self, key: &str, value: V) {
        self.set_at(key, value, Instant::now());
    }

    /// [`TtlCache::get`] with an explicit clock, for deterministic tests.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) <= self.ttl => {
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// [`TtlCache::set`] with an explicit clock, for deterministic tests.
    pub fn set_at(&self, key: &str, value: V, now: Instant) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key.to_string(),
            Entry {
                stored_at: now,
                value,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_on_unknown_key() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
        assert_eq!(cache.get("nope"), None);
    }

    #[test]
    fn hit_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.set_at("k", 7u32, t0);
        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(59)), Some(7));
    }

    #[test]
    fn entry_exactly_at_ttl_still_hits() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.set_at("k", 7u32, t0);
        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(60)), Some(7));
    }

    #[test]
    fn entry_past_ttl_is_evicted() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.set_at("k", 7u32, t0);
        assert_eq!(
            cache.get_at("k", t0 + Duration::from_secs(61)),
            None,
            "entry older than TTL must read as absent"
        );
        // The expired read evicted the entry; even a read back at t0 misses now.
        assert_eq!(cache.get_at("k", t0), None);
    }

    #[test]
    fn set_overwrites_and_restamps() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.set_at("k", 1u32, t0);
        cache.set_at("k", 2u32, t0 + Duration::from_secs(50));
        // Re-stamped at t0+50, so still live at t0+100.
        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(100)), Some(2));
    }
}
