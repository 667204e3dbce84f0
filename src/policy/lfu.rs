//! LFU (Least Frequently Used) replacement policy with age reduction.
//!
//! Evicts the entry with the lowest access frequency, breaking ties toward
//! the entry that has sat longest in its bucket (LRU within the bucket).
//! A global ageing mechanism bounds counter growth so cold-but-once-hot
//! entries cannot become immortal.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────┐
//!   │                       LfuCore<K, V>                           │
//!   │                                                               │
//!   │   values: FxHashMap<K, V>                                     │
//!   │   buckets: FrequencyBuckets<K>                                │
//!   │                                                               │
//!   │   freq 1: [e] ◄──► [f]          ← min_freq bucket;            │
//!   │   freq 3: [b]                     stale end is the victim     │
//!   │   freq 7: [a] ◄──► [c]                                        │
//!   │                                                               │
//!   │   total_freq / len  >  max_average  ⇒  ageing:                │
//!   │     every freq -= max_average / 2 (clamped at 1),             │
//!   │     buckets rebuilt, min_freq recomputed                      │
//!   └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ageing
//!
//! Every access (hit or insert) bumps a running `total_freq`. When
//! `total_freq / len` exceeds `max_average`, every entry's frequency drops
//! by `max_average / 2` and the buckets are rebuilt. `total_freq` is
//! adjusted by the nominal reduction, so after ageing cycles it is an
//! approximation of the true sum; nothing here depends on exact equality.
//!
//! ## Example
//!
//! ```
//! use cacheplex::policy::lfu::LfuCache;
//! use cacheplex::traits::CacheEngine;
//!
//! let cache = LfuCache::new(2);
//! cache.put(1, "a");
//! cache.put(2, "b");
//! cache.get(&1);
//! cache.get(&1);
//! cache.get(&2);
//! cache.put(3, "c"); // key 2 has the lower frequency: evicted
//!
//! assert_eq!(cache.get(&1), Some("a"));
//! assert_eq!(cache.get(&2), None);
//! assert_eq!(cache.get(&3), Some("c"));
//! ```

use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::FrequencyBuckets;
use crate::error::ConfigError;
#[cfg(feature = "metrics")]
use crate::metrics::{CacheMetricsSnapshot, EngineMetrics};
use crate::traits::{CacheEngine, ConcurrentCache};

/// Age-reduction threshold used when none is configured.
pub const DEFAULT_MAX_AVERAGE: u64 = 10;

#[derive(Debug)]
/// Single-threaded LFU core. Not synchronized; see [`LfuCache`].
pub struct LfuCore<K, V> {
    values: FxHashMap<K, V>,
    buckets: FrequencyBuckets<K>,
    total_freq: u64,
    max_average: u64,
    capacity: usize,
}

impl<K, V> LfuCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LFU core with the given capacity and age-reduction
    /// threshold.
    pub fn new(capacity: usize, max_average: u64) -> Self {
        Self {
            values: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: FrequencyBuckets::new(),
            total_freq: 0,
            max_average,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the current access frequency of `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.buckets.frequency(key)
    }

    /// Returns the smallest frequency with a non-empty bucket.
    pub fn min_freq(&self) -> Option<u64> {
        self.buckets.min_freq()
    }

    pub fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if let Some(slot) = self.values.get_mut(&key) {
            *slot = value;
            self.promote(&key);
            return;
        }
        if self.values.len() >= self.capacity {
            self.evict_one();
        }
        self.values.insert(key.clone(), value);
        self.buckets.insert(key);
        self.note_access();
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        if !self.values.contains_key(key) {
            return None;
        }
        self.promote(key);
        self.values.get(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.buckets.clear();
        self.total_freq = 0;
    }

    fn promote(&mut self, key: &K) {
        self.buckets.promote(key);
        self.note_access();
    }

    // Bump the running total and trigger ageing once the average crosses
    // the configured threshold.
    fn note_access(&mut self) {
        self.total_freq += 1;
        if self.values.is_empty() {
            return;
        }
        let average = self.total_freq / self.values.len() as u64;
        if average > self.max_average {
            self.age_entries();
        }
    }

    fn age_entries(&mut self) {
        let delta = self.max_average / 2;
        self.buckets.scale_down(delta);
        self.total_freq = self
            .total_freq
            .saturating_sub(delta * self.values.len() as u64);
    }

    // Drop the stale-end entry of the minimum bucket. min_freq is not
    // rescanned: the insertion that follows resets it to 1.
    fn evict_one(&mut self) {
        if let Some((key, freq)) = self.buckets.evict_min() {
            self.values.remove(&key);
            self.total_freq = self.total_freq.saturating_sub(freq);
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert!(self.values.len() <= self.capacity);
        assert_eq!(self.values.len(), self.buckets.len());
        for key in self.values.keys() {
            assert!(self.buckets.contains(key));
        }
        self.buckets.debug_validate_invariants();
    }
}

/// Thread-safe LFU engine: an [`LfuCore`] behind a single mutex.
#[derive(Debug)]
pub struct LfuCache<K, V> {
    inner: Mutex<LfuCore<K, V>>,
    #[cfg(feature = "metrics")]
    metrics: EngineMetrics,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LFU engine with the default age-reduction threshold.
    pub fn new(capacity: usize) -> Self {
        Self::with_max_average(capacity, DEFAULT_MAX_AVERAGE)
    }

    /// Creates an LFU engine with an explicit age-reduction threshold.
    pub fn with_max_average(capacity: usize, max_average: u64) -> Self {
        Self {
            inner: Mutex::new(LfuCore::new(capacity, max_average)),
            #[cfg(feature = "metrics")]
            metrics: EngineMetrics::default(),
        }
    }

    /// Validating constructor: `max_average` must be at least 1.
    pub fn try_new(capacity: usize, max_average: u64) -> Result<Self, ConfigError> {
        if max_average == 0 {
            return Err(ConfigError::new("max_average must be >= 1"));
        }
        Ok(Self::with_max_average(capacity, max_average))
    }

    /// Returns the current access frequency of `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.inner.lock().frequency(key)
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        let core = self.inner.lock();
        self.metrics.snapshot(core.len(), core.capacity())
    }
}

impl<K, V> CacheEngine<K, V> for LfuCache<K, V>
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

impl<K, V> ConcurrentCache for LfuCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(capacity: usize) -> LfuCore<u32, &'static str> {
        LfuCore::new(capacity, DEFAULT_MAX_AVERAGE)
    }

    #[test]
    fn lfu_put_get_roundtrip() {
        let mut cache = core(4);
        cache.put(1, "one");
        assert_eq!(cache.get(&1), Some(&"one"));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.frequency(&1), Some(2)); // insert + hit
    }

    #[test]
    fn lfu_evicts_lowest_frequency_with_lru_tie_break() {
        let mut cache = core(2);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.get(&1);
        cache.get(&1);
        cache.get(&2);

        cache.put(3, "c"); // key 2 (freq 2) loses to key 1 (freq 3)
        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&3), Some(&"c"));
        cache.debug_validate_invariants();
    }

    #[test]
    fn lfu_tie_broken_by_bucket_age() {
        let mut cache = core(2);
        cache.put(1, "a");
        cache.put(2, "b");
        // Both at frequency 1; key 1 is staler in the bucket.
        cache.put(3, "c");
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
        assert!(cache.contains(&3));
    }

    #[test]
    fn lfu_update_promotes_existing_key() {
        let mut cache = core(2);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(1, "a2"); // update counts as an access

        assert_eq!(cache.frequency(&1), Some(2));
        cache.put(3, "c"); // 2 is the minimum now
        assert!(!cache.contains(&2));
        assert_eq!(cache.get(&1), Some(&"a2"));
    }

    #[test]
    fn lfu_min_freq_tracks_smallest_nonempty_bucket() {
        let mut cache = core(3);
        cache.put(1, "a");
        cache.put(2, "b");
        assert_eq!(cache.min_freq(), Some(1));

        cache.get(&1);
        assert_eq!(cache.min_freq(), Some(1));
        cache.get(&2);
        assert_eq!(cache.min_freq(), Some(2)); // bucket 1 emptied
    }

    #[test]
    fn lfu_ageing_halves_hot_counters() {
        let mut cache: LfuCore<u32, &str> = LfuCore::new(3, 2);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c");
        for _ in 0..10 {
            cache.get(&1);
        }

        // Ageing fired at least once: key 1's counter was pulled back well
        // below the 11 raw accesses, cold keys stay clamped at 1.
        let hot = cache.frequency(&1).unwrap();
        assert!(hot < 11, "ageing never fired, freq={hot}");
        assert_eq!(cache.frequency(&2), Some(1));
        assert_eq!(cache.frequency(&3), Some(1));

        // A cold insert evicts one of the floor-frequency keys, never the
        // hot one.
        cache.put(4, "d");
        assert!(cache.contains(&1));
        assert!(cache.contains(&4));
        assert_eq!(cache.len(), 3);
        cache.debug_validate_invariants();
    }

    #[test]
    fn lfu_zero_capacity_ignores_puts() {
        let mut cache = core(0);
        cache.put(1, "a");
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn lfu_capacity_one_keeps_latest() {
        let mut cache = core(1);
        cache.put(1, "a");
        cache.put(2, "b");
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(&"b"));
    }

    #[test]
    fn lfu_clear_resets_state() {
        let mut cache = core(2);
        cache.put(1, "a");
        cache.get(&1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.min_freq(), None);
        cache.put(2, "b");
        assert_eq!(cache.get(&2), Some(&"b"));
    }

    #[test]
    fn lfu_try_new_rejects_zero_max_average() {
        let err = LfuCache::<u32, u32>::try_new(10, 0).unwrap_err();
        assert!(err.to_string().contains("max_average"));
        assert!(LfuCache::<u32, u32>::try_new(10, 1).is_ok());
    }

    #[test]
    fn lfu_engine_get_returns_copies() {
        let cache = LfuCache::new(2);
        cache.put(1, String::from("a"));
        let first = cache.get(&1);
        let second = cache.get(&1);
        assert_eq!(first, second);
        assert_eq!(cache.frequency(&1), Some(3));
    }
}
