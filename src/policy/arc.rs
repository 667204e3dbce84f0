//! ARC-style adaptive replacement policy.
//!
//! Composes a recency sub-cache (T1, LRU-ordered) and a frequency
//! sub-cache (T2, frequency-bucketed), each shadowed by a ghost list of
//! recently evicted keys (B1, B2). Ghost hits shift capacity toward the
//! sub-cache that lost the key, so the split between recency and
//! frequency tracks the workload with no manual tuning.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                         ArcCore<K, V>                            │
//!   │                                                                  │
//!   │   T1 (recency, capacity c1)        T2 (frequency, capacity c2)   │
//!   │   ┌────────────────────────┐       ┌───────────────────────────┐ │
//!   │   │ OrderedIndex, LRU      │       │ values + FrequencyBuckets │ │
//!   │   │ entries carry an       │──────►│ stale end of min bucket   │ │
//!   │   │ access counter         │promote│ is the victim             │ │
//!   │   └──────────┬─────────────┘       └──────────────┬────────────┘ │
//!   │              │ evict                              │ evict        │
//!   │              ▼                                    ▼              │
//!   │   B1 ghost list (keys only)         B2 ghost list (keys only)    │
//!   │                                                                  │
//!   │   ghost hit in B1  ⇒  c2 -= 1, c1 += 1  (recency under-sized)    │
//!   │   ghost hit in B2  ⇒  c1 -= 1, c2 += 1  (frequency under-sized)  │
//!   │   c1 + c2 is constant                                            │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Per-key state machine
//!
//! ```text
//!   (absent) ──put──► T1
//!     T1 ── access count reaches threshold ──► T2  (copied; the T1 entry
//!     T1 ── lru eviction ──► B1                     ages out on its own)
//!     T2 ── min-bucket eviction ──► B2
//!     B1 ── access ──► c1 grows; a following put lands the key in T1
//!     B2 ── access ──► c2 grows; a following put lands the key in T1+T2
//! ```
//!
//! ## Sizing
//!
//! Both sub-caches are constructed at the full configured `capacity`, so
//! steady-state residency can reach `2 × capacity` and the conserved
//! total is `c1 + c2 = 2 × capacity`. Callers wanting a strict bound of
//! `C` entries should configure `C / 2`. Ghost capacities track their
//! sub-cache's capacity as transfers happen.
//!
//! ## Example
//!
//! ```
//! use cacheplex::policy::arc::ArcCache;
//! use cacheplex::traits::CacheEngine;
//!
//! let cache = ArcCache::new(4);
//! cache.put(1, "a");
//! assert_eq!(cache.get(&1), Some("a")); // T1 hit, count 2: copied to T2
//! assert_eq!(cache.t2_len(), 1);
//! ```

use std::hash::Hash;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::{FrequencyBuckets, GhostList, OrderedIndex};
#[cfg(feature = "metrics")]
use crate::metrics::{CacheMetricsSnapshot, EngineMetrics};
use crate::traits::{CacheEngine, ConcurrentCache};

/// Access count at which a T1 entry is copied into T2.
pub const DEFAULT_TRANSFORM_THRESHOLD: u64 = 2;

#[derive(Debug)]
struct RecencyEntry<V> {
    value: V,
    access_count: u64,
}

/// T1 + B1: LRU-ordered residents with per-entry access counts.
#[derive(Debug)]
struct RecencyPart<K, V> {
    resident: OrderedIndex<K, RecencyEntry<V>>,
    ghost: GhostList<K>,
    capacity: usize,
    transform_threshold: u64,
}

impl<K, V> RecencyPart<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new(capacity: usize, transform_threshold: u64) -> Self {
        Self {
            resident: OrderedIndex::with_capacity(capacity),
            ghost: GhostList::new(capacity),
            capacity,
            transform_threshold,
        }
    }

    fn contains(&self, key: &K) -> bool {
        self.resident.contains(key)
    }

    fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if let Some(entry) = self.resident.get_mut(&key) {
            entry.value = value;
            self.resident.move_to_back(&key);
            return;
        }
        if self.resident.len() >= self.capacity {
            self.evict_one();
        }
        self.resident.push_back(
            key,
            RecencyEntry {
                value,
                access_count: 1,
            },
        );
    }

    // Hit: refresh recency, bump the counter, and report whether the
    // entry just reached the promotion threshold.
    fn get(&mut self, key: &K) -> Option<(V, bool)>
    where
        V: Clone,
    {
        if !self.resident.move_to_back(key) {
            return None;
        }
        let threshold = self.transform_threshold;
        let entry = self.resident.get_mut(key)?;
        entry.access_count += 1;
        let promote = entry.access_count >= threshold;
        Some((entry.value.clone(), promote))
    }

    // Ghost hit check; consumes the record.
    fn take_ghost_hit(&mut self, key: &K) -> bool {
        self.ghost.remove(key)
    }

    fn increase_capacity(&mut self) {
        self.capacity += 1;
        self.ghost.set_capacity(self.capacity);
    }

    // Refused at zero. At full residency one entry is evicted first so
    // the new bound holds.
    fn decrease_capacity(&mut self) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.resident.len() >= self.capacity {
            self.evict_one();
        }
        self.capacity -= 1;
        self.ghost.set_capacity(self.capacity);
        true
    }

    fn evict_one(&mut self) {
        if let Some((key, _)) = self.resident.pop_front() {
            self.ghost.record(key);
        }
    }

    fn clear(&mut self) {
        self.resident.clear();
        self.ghost.clear();
    }
}

/// T2 + B2: frequency-bucketed residents.
#[derive(Debug)]
struct FrequencyPart<K, V> {
    values: FxHashMap<K, V>,
    buckets: FrequencyBuckets<K>,
    ghost: GhostList<K>,
    capacity: usize,
}

impl<K, V> FrequencyPart<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new(capacity: usize) -> Self {
        Self {
            values: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: FrequencyBuckets::new(),
            ghost: GhostList::new(capacity),
            capacity,
        }
    }

    fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if let Some(slot) = self.values.get_mut(&key) {
            *slot = value;
            self.buckets.promote(&key);
            return;
        }
        if self.values.len() >= self.capacity {
            self.evict_one();
        }
        self.values.insert(key.clone(), value);
        self.buckets.insert(key);
    }

    fn get(&mut self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        if !self.values.contains_key(key) {
            return None;
        }
        self.buckets.promote(key);
        self.values.get(key).cloned()
    }

    fn take_ghost_hit(&mut self, key: &K) -> bool {
        self.ghost.remove(key)
    }

    fn increase_capacity(&mut self) {
        self.capacity += 1;
        self.ghost.set_capacity(self.capacity);
    }

    fn decrease_capacity(&mut self) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.values.len() >= self.capacity {
            self.evict_one();
        }
        self.capacity -= 1;
        self.ghost.set_capacity(self.capacity);
        true
    }

    // Victim is the stale end of the minimum bucket. Unlike the
    // standalone LFU engine, the watermark is rescanned right away:
    // evictions here are not always followed by an insertion.
    fn evict_one(&mut self) {
        if let Some((key, _)) = self.buckets.evict_min() {
            self.values.remove(&key);
            self.ghost.record(key);
        }
        self.buckets.refresh_min();
    }

    fn clear(&mut self) {
        self.values.clear();
        self.buckets.clear();
        self.ghost.clear();
    }
}

#[derive(Debug)]
/// Single-threaded ARC core. Not synchronized; see [`ArcCache`].
pub struct ArcCore<K, V> {
    recency: RecencyPart<K, V>,
    frequency: FrequencyPart<K, V>,
    // c1 + c2 never moves off this.
    capacity_total: usize,
}

impl<K, V> ArcCore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an ARC core. Each sub-cache starts at `capacity`, so the
    /// conserved total is `2 × capacity` (see the module docs on sizing).
    pub fn new(capacity: usize, transform_threshold: u64) -> Self {
        Self {
            recency: RecencyPart::new(capacity, transform_threshold),
            frequency: FrequencyPart::new(capacity),
            capacity_total: capacity * 2,
        }
    }

    /// Resident entries across both sub-caches. A key promoted to T2
    /// whose T1 copy has not yet aged out counts twice.
    pub fn len(&self) -> usize {
        self.recency.resident.len() + self.frequency.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The conserved capacity total `c1 + c2`.
    pub fn capacity(&self) -> usize {
        self.capacity_total
    }

    pub fn contains(&self, key: &K) -> bool {
        self.recency.contains(key) || self.frequency.contains(key)
    }

    pub fn put(&mut self, key: K, value: V) {
        self.rebalance(&key);
        self.recency.put(key.clone(), value.clone());
        // Keep a promoted copy coherent while T2 holds the hot form.
        if self.frequency.contains(&key) {
            self.frequency.put(key, value);
        }
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        self.rebalance(key);
        if let Some((value, promote)) = self.recency.get(key) {
            if promote {
                // Copy into T2; the T1 entry stays and ages out normally.
                self.frequency.put(key.clone(), value.clone());
            }
            return Some(value);
        }
        self.frequency.get(key)
    }

    pub fn clear(&mut self) {
        self.recency.clear();
        self.frequency.clear();
        let half = self.capacity_total / 2;
        self.recency.capacity = half;
        self.recency.ghost.set_capacity(half);
        self.frequency.capacity = self.capacity_total - half;
        self.frequency.ghost.set_capacity(self.capacity_total - half);
    }

    /// Current recency-side capacity (c1).
    pub fn recency_capacity(&self) -> usize {
        self.recency.capacity
    }

    /// Current frequency-side capacity (c2).
    pub fn frequency_capacity(&self) -> usize {
        self.frequency.capacity
    }

    /// Residents in T1.
    pub fn t1_len(&self) -> usize {
        self.recency.resident.len()
    }

    /// Residents in T2.
    pub fn t2_len(&self) -> usize {
        self.frequency.values.len()
    }

    /// Keys tracked in B1.
    pub fn b1_len(&self) -> usize {
        self.recency.ghost.len()
    }

    /// Keys tracked in B2.
    pub fn b2_len(&self) -> usize {
        self.frequency.ghost.len()
    }

    // Ghost-driven capacity transfer, run before any mutation. The ghost
    // record is consumed either way; the transfer only happens when the
    // donor side can actually give up a slot.
    fn rebalance(&mut self, key: &K) {
        if self.recency.take_ghost_hit(key) {
            if self.frequency.decrease_capacity() {
                self.recency.increase_capacity();
            }
        } else if self.frequency.take_ghost_hit(key) {
            if self.recency.decrease_capacity() {
                self.frequency.increase_capacity();
            }
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(
            self.recency.capacity + self.frequency.capacity,
            self.capacity_total,
            "capacity transfer leaked"
        );
        assert!(self.recency.resident.len() <= self.recency.capacity);
        assert!(self.frequency.values.len() <= self.frequency.capacity);
        assert_eq!(self.recency.ghost.capacity(), self.recency.capacity);
        assert_eq!(self.frequency.ghost.capacity(), self.frequency.capacity);
        assert_eq!(self.frequency.values.len(), self.frequency.buckets.len());
        self.recency.resident.debug_validate_invariants();
        self.recency.ghost.debug_validate_invariants();
        self.frequency.ghost.debug_validate_invariants();
        self.frequency.buckets.debug_validate_invariants();
    }
}

/// Thread-safe ARC engine: an [`ArcCore`] behind a single mutex.
#[derive(Debug)]
pub struct ArcCache<K, V> {
    inner: Mutex<ArcCore<K, V>>,
    #[cfg(feature = "metrics")]
    metrics: EngineMetrics,
}

impl<K, V> ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an ARC engine with the default transform threshold.
    pub fn new(capacity: usize) -> Self {
        Self::with_threshold(capacity, DEFAULT_TRANSFORM_THRESHOLD)
    }

    /// Creates an ARC engine with an explicit transform threshold.
    pub fn with_threshold(capacity: usize, transform_threshold: u64) -> Self {
        Self {
            inner: Mutex::new(ArcCore::new(capacity, transform_threshold)),
            #[cfg(feature = "metrics")]
            metrics: EngineMetrics::default(),
        }
    }

    /// Residents in T1.
    pub fn t1_len(&self) -> usize {
        self.inner.lock().t1_len()
    }

    /// Residents in T2.
    pub fn t2_len(&self) -> usize {
        self.inner.lock().t2_len()
    }

    /// Current recency-side capacity (c1).
    pub fn recency_capacity(&self) -> usize {
        self.inner.lock().recency_capacity()
    }

    /// Current frequency-side capacity (c2).
    pub fn frequency_capacity(&self) -> usize {
        self.inner.lock().frequency_capacity()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        let core = self.inner.lock();
        self.metrics.snapshot(core.len(), core.capacity())
    }
}

impl<K, V> CacheEngine<K, V> for ArcCache<K, V>
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
        let hit = self.inner.lock().get(key);
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

impl<K, V> ConcurrentCache for ArcCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(capacity: usize) -> ArcCore<u32, &'static str> {
        ArcCore::new(capacity, DEFAULT_TRANSFORM_THRESHOLD)
    }

    #[test]
    fn arc_new_cache_splits_capacity() {
        let cache = core(4);
        assert_eq!(cache.capacity(), 8);
        assert_eq!(cache.recency_capacity(), 4);
        assert_eq!(cache.frequency_capacity(), 4);
        assert!(cache.is_empty());
    }

    #[test]
    fn arc_insert_lands_in_t1() {
        let mut cache = core(4);
        cache.put(1, "a");
        assert_eq!(cache.t1_len(), 1);
        assert_eq!(cache.t2_len(), 0);
        assert!(cache.contains(&1));
        cache.debug_validate_invariants();
    }

    #[test]
    fn arc_threshold_hit_copies_into_t2() {
        let mut cache = core(4);
        cache.put(1, "a"); // access count 1
        assert_eq!(cache.get(&1), Some("a")); // count 2: promoted

        assert_eq!(cache.t1_len(), 1, "T1 copy is retained");
        assert_eq!(cache.t2_len(), 1);
        cache.debug_validate_invariants();
    }

    #[test]
    fn arc_put_syncs_value_held_in_t2() {
        let mut cache = core(4);
        cache.put(1, "a");
        cache.get(&1); // promoted to T2

        cache.put(1, "a2");
        // Both copies hold the new value; either lookup path agrees.
        assert_eq!(cache.get(&1), Some("a2"));
        let t2_value = cache.frequency.get(&1);
        assert_eq!(t2_value, Some("a2"));
    }

    #[test]
    fn arc_t1_eviction_records_ghost() {
        let mut cache = core(2);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c"); // T1 full: 1 evicted into B1

        assert!(!cache.contains(&1));
        assert_eq!(cache.b1_len(), 1);
        assert_eq!(cache.t1_len(), 2);
        cache.debug_validate_invariants();
    }

    #[test]
    fn arc_b1_hit_transfers_capacity_to_recency() {
        let mut cache = core(2);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c");
        cache.put(4, "d"); // 1 and 2 now ghosts in B1
        assert_eq!(cache.b1_len(), 2);

        // Access to a B1 ghost: c2 donates a slot to c1. The value is
        // gone, so the get itself still misses.
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.recency_capacity(), 3);
        assert_eq!(cache.frequency_capacity(), 1);
        assert_eq!(cache.b1_len(), 1, "ghost record consumed");
        cache.debug_validate_invariants();

        // The following put re-admits the key to the grown T1.
        cache.put(1, "a");
        assert!(cache.contains(&1));
        assert_eq!(cache.t1_len(), 3);
    }

    #[test]
    fn arc_b2_hit_transfers_capacity_to_frequency() {
        let mut cache: ArcCore<u32, u32> = ArcCore::new(2, 2);
        cache.put(1, 10);
        cache.put(2, 20);
        cache.put(3, 30); // 1 -> B1
        cache.put(1, 11); // B1 hit: c1=3, c2=1; T1 is [2, 3, 1]
        assert_eq!(cache.frequency_capacity(), 1);

        cache.get(&1); // second access: copied into T2
        cache.put(4, 40); // T1 full: 2 -> B1
        cache.get(&4); // promotion overflows T2 (c2=1): 1 -> B2
        assert_eq!(cache.b2_len(), 1);
        cache.debug_validate_invariants();

        // B2 ghost hit: c1 donates a slot back to c2. The T1 copy of key
        // 1 is still resident, so the same access also hits.
        assert_eq!(cache.get(&1), Some(11));
        assert_eq!(cache.recency_capacity(), 2);
        assert_eq!(cache.frequency_capacity(), 2);
        assert_eq!(cache.b2_len(), 0);
        cache.debug_validate_invariants();
    }

    #[test]
    fn arc_capacity_total_is_conserved() {
        let mut cache: ArcCore<u32, u32> = ArcCore::new(3, 2);
        for i in 0..40 {
            cache.put(i % 11, i);
            cache.get(&(i % 7));
            assert_eq!(
                cache.recency_capacity() + cache.frequency_capacity(),
                cache.capacity()
            );
            cache.debug_validate_invariants();
        }
    }

    #[test]
    fn arc_decrease_refused_at_zero_skips_transfer() {
        let mut cache: ArcCore<u32, u32> = ArcCore::new(1, 2);
        cache.put(1, 10);
        cache.put(2, 20); // 1 -> B1
        cache.put(1, 11); // B1 hit drains c2 to 0: c1=2, c2=0
        assert_eq!(cache.frequency_capacity(), 0);

        cache.put(3, 30); // T1 full: 2 -> B1
        // B1 hit on 2, but c2 has nothing left to donate: the ghost
        // record is consumed and capacities stay put.
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.recency_capacity(), 2);
        assert_eq!(cache.frequency_capacity(), 0);
        assert_eq!(cache.b1_len(), 0);
        cache.debug_validate_invariants();
    }

    #[test]
    fn arc_ghost_capacity_tracks_transfers() {
        let mut cache = core(2);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c");
        cache.put(4, "d");
        cache.get(&1); // B1 hit: c1=3, c2=1

        assert_eq!(cache.recency.ghost.capacity(), 3);
        assert_eq!(cache.frequency.ghost.capacity(), 1);
        cache.debug_validate_invariants();
    }

    #[test]
    fn arc_zero_capacity_is_inert() {
        let mut cache = core(0);
        cache.put(1, "a");
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.capacity(), 0);
    }

    #[test]
    fn arc_clear_resets_split() {
        let mut cache = core(2);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c");
        cache.get(&2);
        cache.get(&2);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.recency_capacity(), 2);
        assert_eq!(cache.frequency_capacity(), 2);
        assert_eq!(cache.b1_len(), 0);
        assert_eq!(cache.b2_len(), 0);
        cache.debug_validate_invariants();
    }

    #[test]
    fn arc_engine_roundtrip() {
        let cache = ArcCache::new(2);
        cache.put(1, 10u64);
        assert_eq!(cache.get(&1), Some(10));
        assert_eq!(cache.t2_len(), 1);
        cache.purge();
        assert!(cache.is_empty());
    }
}
