//! LRU-K admission filter.
//!
//! A backing LRU only admits a key after it has been accessed `K` times.
//! Until then the key lives in a *history* (a small LRU of per-key access
//! counts) with its last-seen value parked in a staging map. One-shot
//! scans never reach the main cache, so they cannot pollute the hot set.
//!
//! ## Admission Flow
//!
//! ```text
//!   put(k, v) / get(k)
//!        │
//!        ▼
//!   in main? ──yes──► touch main entry (and overwrite on put)
//!        │no
//!        ▼
//!   history[k] += 1, stage v (put only)
//!        │
//!        ▼
//!   count >= K? ──yes──► move staged value into main,
//!        │no             drop history + staging records
//!        ▼
//!   stays in history (get reports a miss)
//! ```
//!
//! When the history LRU evicts a key's counter, the key's staged value is
//! dropped with it, so staging is bounded by `history_capacity`.
//!
//! ## Example
//!
//! ```
//! use cacheplex::policy::lru_k::LrukCache;
//! use cacheplex::traits::CacheEngine;
//!
//! let cache = LrukCache::new(2, 4, 2);
//! cache.put(1, "a");  // 1 access: history only, not resident
//! assert!(!cache.contains(&1));
//! // 2nd access reaches K: the staged value is admitted and returned.
//! assert_eq!(cache.get(&1), Some("a"));
//! ```
//!
//! A `get` below the threshold reports a miss even though it advances the
//! key's counter; only the access that reaches `K` with a staged value in
//! hand returns data.

use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::ConfigError;
#[cfg(feature = "metrics")]
use crate::metrics::{CacheMetricsSnapshot, EngineMetrics};
use crate::policy::lru::LruCore;
use crate::traits::{CacheEngine, ConcurrentCache};

#[derive(Debug)]
/// Single-threaded LRU-K core. Not synchronized; see [`LrukCache`].
pub struct LrukCore<K, V> {
    main: LruCore<K, V>,
    history: LruCore<K, u64>,
    staging: FxHashMap<K, V>,
    k: u64,
}

impl<K, V> LrukCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU-K core.
    ///
    /// - `capacity`: main (hot) cache capacity
    /// - `history_capacity`: how many not-yet-admitted keys keep counters
    /// - `k`: accesses required for admission
    pub fn new(capacity: usize, history_capacity: usize, k: u64) -> Self {
        Self {
            main: LruCore::new(capacity),
            history: LruCore::new(history_capacity),
            staging: FxHashMap::default(),
            k,
        }
    }

    /// Number of entries admitted to the main cache.
    pub fn len(&self) -> usize {
        self.main.len()
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty()
    }

    /// Main-cache capacity.
    pub fn capacity(&self) -> usize {
        self.main.capacity()
    }

    /// Admission threshold.
    pub fn k(&self) -> u64 {
        self.k
    }

    /// Membership in the main cache only; staged keys are not resident.
    pub fn contains(&self, key: &K) -> bool {
        self.main.contains(key)
    }

    /// Recorded access count for a key still in history.
    pub fn history_count(&self, key: &K) -> Option<u64> {
        self.history.peek(key).copied()
    }

    pub fn put(&mut self, key: K, value: V) {
        if self.main.contains(&key) {
            self.main.put(key, value);
            return;
        }
        let count = self.bump_history(&key);
        if count >= self.k {
            self.history.remove(&key);
            self.staging.remove(&key);
            self.main.put(key, value);
        } else {
            self.staging.insert(key, value);
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.main.contains(key) {
            return self.main.get(key);
        }
        let count = self.bump_history(key);
        if count >= self.k {
            if let Some(value) = self.staging.remove(key) {
                self.history.remove(key);
                self.main.put(key.clone(), value);
                return self.main.peek(key);
            }
        }
        None
    }

    pub fn clear(&mut self) {
        self.main.clear();
        self.history.clear();
        self.staging.clear();
    }

    // Increments the key's history counter. A counter displaced from the
    // history LRU takes its staged value with it.
    fn bump_history(&mut self, key: &K) -> u64 {
        let count = self.history.peek(key).copied().unwrap_or(0) + 1;
        if let Some((displaced, _)) = self.history.put(key.clone(), count) {
            self.staging.remove(&displaced);
        }
        count
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.main.debug_validate_invariants();
        self.history.debug_validate_invariants();
        for key in self.staging.keys() {
            assert!(
                !self.main.contains(key),
                "staged key is also resident in main"
            );
            assert!(
                self.history.contains(key),
                "staged key has no history counter"
            );
        }
    }
}

/// Thread-safe LRU-K engine: a [`LrukCore`] behind a single mutex.
#[derive(Debug)]
pub struct LrukCache<K, V> {
    inner: Mutex<LrukCore<K, V>>,
    #[cfg(feature = "metrics")]
    metrics: EngineMetrics,
}

impl<K, V> LrukCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU-K engine; see [`LrukCore::new`] for parameters.
    pub fn new(capacity: usize, history_capacity: usize, k: u64) -> Self {
        Self {
            inner: Mutex::new(LrukCore::new(capacity, history_capacity, k)),
            #[cfg(feature = "metrics")]
            metrics: EngineMetrics::default(),
        }
    }

    /// Validating constructor: `k` must be at least 1.
    pub fn try_new(capacity: usize, history_capacity: usize, k: u64) -> Result<Self, ConfigError> {
        if k == 0 {
            return Err(ConfigError::new("k must be >= 1"));
        }
        Ok(Self::new(capacity, history_capacity, k))
    }

    /// Admission threshold.
    pub fn k(&self) -> u64 {
        self.inner.lock().k()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        let core = self.inner.lock();
        self.metrics.snapshot(core.len(), core.capacity())
    }
}

impl<K, V> CacheEngine<K, V> for LrukCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        #[cfg(feature = "metrics")]
        self.metrics.record_put();
        self.inner.lock().put(key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        let hit = self.inner.lock().get(key).cloned();
        #[cfg(feature = "metrics")]
        self.metrics.record_get(hit.is_some());
        hit
    }

    fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    fn len(&self) -> usize {
        self.inner.lock().len()
    }

    fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    fn purge(&self) {
        self.inner.lock().clear();
    }
}

impl<K, V> ConcurrentCache for LrukCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lruk_admits_after_k_puts() {
        let mut cache = LrukCore::new(2, 4, 3);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c");
        assert!(cache.is_empty()); // nothing admitted yet

        cache.put(1, "a");
        cache.put(1, "a"); // third access: admitted
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&1), Some(&"a"));
        assert!(!cache.contains(&2));
        assert!(!cache.contains(&3));
        cache.debug_validate_invariants();
    }

    #[test]
    fn lruk_no_admission_below_k() {
        let mut cache = LrukCore::new(2, 4, 2);
        cache.put(1, "a");
        assert!(!cache.contains(&1));
        assert_eq!(cache.history_count(&1), Some(1));
    }

    #[test]
    fn lruk_get_promotes_staged_value_on_kth_access() {
        let mut cache = LrukCore::new(2, 4, 2);
        cache.put(1, "a"); // count 1, staged
        assert_eq!(cache.get(&1), Some(&"a")); // count 2: admitted and returned
        assert!(cache.contains(&1));
        assert_eq!(cache.history_count(&1), None);
    }

    #[test]
    fn lruk_get_without_staged_value_misses() {
        let mut cache: LrukCore<u32, &str> = LrukCore::new(2, 4, 2);
        assert_eq!(cache.get(&1), None); // count 1
        assert_eq!(cache.get(&1), None); // count 2, but nothing staged
        assert!(!cache.contains(&1));

        // A put now sees the count already past K and admits directly.
        cache.put(1, "late");
        assert_eq!(cache.get(&1), Some(&"late"));
    }

    #[test]
    fn lruk_overwrite_in_main_touches() {
        let mut cache = LrukCore::new(2, 4, 1);
        cache.put(1, "a"); // k=1: admitted immediately
        cache.put(2, "b");
        cache.put(1, "a2"); // overwrite refreshes recency

        cache.put(3, "c"); // evicts 2, the stale entry
        assert!(!cache.contains(&2));
        assert_eq!(cache.get(&1), Some(&"a2"));
    }

    #[test]
    fn lruk_history_eviction_drops_staged_value() {
        let mut cache = LrukCore::new(4, 2, 3);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c"); // history holds 2 keys: 1 displaced

        assert_eq!(cache.history_count(&1), None);
        assert_eq!(cache.history_count(&2), Some(1));
        assert_eq!(cache.history_count(&3), Some(1));
        cache.debug_validate_invariants();

        // Key 1 starts from scratch.
        cache.put(1, "a");
        assert_eq!(cache.history_count(&1), Some(1));
        assert!(!cache.contains(&1));
    }

    #[test]
    fn lruk_staging_stays_bounded() {
        let mut cache = LrukCore::new(4, 3, 2);
        for i in 0..100u32 {
            cache.put(i, i);
        }
        assert!(cache.staging.len() <= 3);
        cache.debug_validate_invariants();
    }

    #[test]
    fn lruk_zero_main_capacity_never_admits() {
        let mut cache = LrukCore::new(0, 4, 1);
        cache.put(1, "a");
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn lruk_clear_resets_all_state() {
        let mut cache = LrukCore::new(2, 4, 2);
        cache.put(1, "a");
        cache.put(1, "a");
        cache.put(2, "b");
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.history_count(&2), None);
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn lruk_try_new_rejects_zero_k() {
        let err = LrukCache::<u32, u32>::try_new(10, 10, 0).unwrap_err();
        assert!(err.to_string().contains("k must"));
        assert!(LrukCache::<u32, u32>::try_new(10, 10, 1).is_ok());
    }

    #[test]
    fn lruk_engine_roundtrip() {
        let cache = LrukCache::new(2, 4, 2);
        cache.put(1, 10u64);
        cache.put(1, 10);
        assert_eq!(cache.get(&1), Some(10));
        assert_eq!(cache.k(), 2);
        cache.purge();
        assert!(cache.is_empty());
    }
}
