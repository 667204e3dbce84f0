//! LRU (Least Recently Used) replacement policy.
//!
//! Evicts the entry that has gone longest without an access. Backed by an
//! [`OrderedIndex`] whose stale end is the victim and whose fresh end is
//! the most recent access; every hit and update splices the entry to the
//! fresh end.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────┐
//!   │                    LruCore<K, V>                        │
//!   │                                                         │
//!   │   OrderedIndex<K, LruEntry<V>>                          │
//!   │                                                         │
//!   │   stale end                              fresh end      │
//!   │   [victim] ◄──► [ ... ] ◄──► [ ... ] ◄──► [newest]      │
//!   │       │                                      ▲          │
//!   │     evict on                      put / get splice      │
//!   │     overflow                          here              │
//!   └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Ties are impossible: every insertion and splice uniquely orders the
//! entry's list position.
//!
//! ## Key Components
//!
//! - [`LruCore`]: single-threaded core; `put` reports the evicted pair so
//!   composites (LRU-K history, tests) can observe evictions
//! - [`LruCache`]: mutex-wrapped engine implementing
//!   [`CacheEngine`](crate::traits::CacheEngine)
//!
//! ## Example
//!
//! ```
//! use cacheplex::policy::lru::LruCache;
//! use cacheplex::traits::CacheEngine;
//!
//! let cache = LruCache::new(2);
//! cache.put(1, "a");
//! cache.put(2, "b");
//! cache.get(&1);        // 1 is now freshest
//! cache.put(3, "c");    // evicts 2
//!
//! assert_eq!(cache.get(&1), Some("a"));
//! assert_eq!(cache.get(&2), None);
//! assert_eq!(cache.get(&3), Some("c"));
//! ```

use std::hash::Hash;

use parking_lot::Mutex;

use crate::ds::OrderedIndex;
#[cfg(feature = "metrics")]
use crate::metrics::{CacheMetricsSnapshot, EngineMetrics};
use crate::traits::{CacheEngine, ConcurrentCache};

#[derive(Debug)]
struct LruEntry<V> {
    value: V,
    access_count: u64,
}

#[derive(Debug)]
/// Single-threaded LRU core. Not synchronized; see [`LruCache`].
pub struct LruCore<K, V> {
    entries: OrderedIndex<K, LruEntry<V>>,
    capacity: usize,
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU core holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: OrderedIndex::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    /// Stores `value` under `key`, returning the pair evicted to make
    /// room, if any.
    ///
    /// An existing key is updated in place and spliced to the fresh end;
    /// a new key at capacity first evicts the stale-end entry.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.capacity == 0 {
            return None;
        }
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.value = value;
            self.entries.move_to_back(&key);
            return None;
        }
        let evicted = if self.entries.len() >= self.capacity {
            self.entries
                .pop_front()
                .map(|(k, entry)| (k, entry.value))
        } else {
            None
        };
        self.entries.push_back(
            key,
            LruEntry {
                value,
                access_count: 1,
            },
        );
        evicted
    }

    /// Returns the value on hit, splicing the entry to the fresh end and
    /// bumping its access counter.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if !self.entries.move_to_back(key) {
            return None;
        }
        let entry = self.entries.get_mut(key)?;
        entry.access_count += 1;
        Some(&entry.value)
    }

    /// Returns the value without touching recency or the access counter.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Returns how many times `key` has been stored or hit.
    pub fn access_count(&self, key: &K) -> Option<u64> {
        self.entries.get(key).map(|entry| entry.access_count)
    }

    /// Returns the stale-end key, the next eviction victim.
    pub fn peek_stale(&self) -> Option<(&K, &V)> {
        self.entries.front().map(|(k, entry)| (k, &entry.value))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert!(self.entries.len() <= self.capacity);
        self.entries.debug_validate_invariants();
    }
}

/// Thread-safe LRU engine: a [`LruCore`] behind a single mutex.
///
/// All operations take `&self` and are safe to call from multiple
/// threads; they linearize in lock-acquisition order.
#[derive(Debug)]
pub struct LruCache<K, V> {
    inner: Mutex<LruCore<K, V>>,
    #[cfg(feature = "metrics")]
    metrics: EngineMetrics,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU engine holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCore::new(capacity)),
            #[cfg(feature = "metrics")]
            metrics: EngineMetrics::default(),
        }
    }

    /// Removes `key`, returning its value.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    /// Returns the value without touching recency.
    pub fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().peek(key).cloned()
    }

    /// Returns how many times `key` has been stored or hit.
    pub fn access_count(&self, key: &K) -> Option<u64> {
        self.inner.lock().access_count(key)
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        let core = self.inner.lock();
        self.metrics.snapshot(core.len(), core.capacity())
    }
}

impl<K, V> CacheEngine<K, V> for LruCache<K, V>
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

impl<K, V> ConcurrentCache for LruCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}
