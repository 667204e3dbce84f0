//! Shard-based concurrency wrapper.
//!
//! Partitions the key space across `N` independent engines so concurrent
//! callers contend on one shard's mutex instead of a single global lock.
//! Each shard gets `⌈C/N⌉` of the total capacity and every operation
//! routes by a deterministic hash of the key; there is no cross-shard
//! coordination and no cross-shard ordering guarantee.
//!
//! ## Architecture
//!
//! ```text
//!   put(k, v) / get(k)
//!        │
//!        ▼
//!   ShardSelector: hash(seed, k) % N
//!        │
//!        ▼
//!   ┌─────────┬─────────┬─────────┬─────────┐
//!   │ shard 0 │ shard 1 │ shard 2 │ shard 3 │   each an independent
//!   │ ⌈C/N⌉   │ ⌈C/N⌉   │ ⌈C/N⌉   │ ⌈C/N⌉   │   engine with its own
//!   └─────────┴─────────┴─────────┴─────────┘   mutex
//! ```
//!
//! A shard count of 0 resolves to the machine's available parallelism.
//!
//! ## Example
//!
//! ```
//! use cacheplex::policy::sharded::ShardedLruCache;
//! use cacheplex::traits::CacheEngine;
//!
//! let cache: ShardedLruCache<u64, String> = ShardedLruCache::new(1024, 4);
//! cache.put(1, "one".to_string());
//! assert_eq!(cache.get(&1), Some("one".to_string()));
//! assert_eq!(cache.shard_count(), 4);
//! ```

use std::hash::Hash;
use std::marker::PhantomData;

use crate::ds::ShardSelector;
use crate::ds::shard::resolve_shard_count;
#[cfg(feature = "metrics")]
use crate::metrics::{CacheMetricsSnapshot, EngineMetrics};
use crate::policy::arc::{ArcCache, DEFAULT_TRANSFORM_THRESHOLD};
use crate::policy::lfu::{DEFAULT_MAX_AVERAGE, LfuCache};
use crate::policy::lru::LruCache;
use crate::policy::lru_k::LrukCache;
use crate::traits::{CacheEngine, ConcurrentCache};

/// `N` independent engines addressed by `hash(key) % N`.
#[derive(Debug)]
pub struct ShardedCache<K, V, E> {
    shards: Vec<E>,
    selector: ShardSelector,
    #[cfg(feature = "metrics")]
    metrics: EngineMetrics,
    _marker: PhantomData<fn(K) -> V>,
}

/// Sharded wrapper over [`LruCache`] shards.
pub type ShardedLruCache<K, V> = ShardedCache<K, V, LruCache<K, V>>;
/// Sharded wrapper over [`LfuCache`] shards.
pub type ShardedLfuCache<K, V> = ShardedCache<K, V, LfuCache<K, V>>;
/// Sharded wrapper over [`LrukCache`] shards.
pub type ShardedLrukCache<K, V> = ShardedCache<K, V, LrukCache<K, V>>;
/// Sharded wrapper over [`ArcCache`] shards.
pub type ShardedArcCache<K, V> = ShardedCache<K, V, ArcCache<K, V>>;

impl<K, V, E> ShardedCache<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: CacheEngine<K, V>,
{
    /// Builds a sharded cache from a per-shard engine constructor.
    ///
    /// `build` is called once per shard with the shard's capacity,
    /// `⌈total_capacity / N⌉`. A `shard_count` of 0 resolves to the
    /// machine's available parallelism.
    pub fn with_engines(
        total_capacity: usize,
        shard_count: usize,
        build: impl Fn(usize) -> E,
    ) -> Self {
        let shard_count = resolve_shard_count(shard_count);
        let per_shard = total_capacity.div_ceil(shard_count);
        let shards = (0..shard_count).map(|_| build(per_shard)).collect();
        Self {
            shards,
            selector: ShardSelector::new(shard_count, 0),
            #[cfg(feature = "metrics")]
            metrics: EngineMetrics::default(),
            _marker: PhantomData,
        }
    }

    /// Number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Resident entries in one shard; useful for distribution checks.
    pub fn shard_len(&self, shard: usize) -> usize {
        self.shards[shard].len()
    }

    fn shard_for(&self, key: &K) -> &E {
        &self.shards[self.selector.shard_for_key(key)]
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        let len = self.shards.iter().map(|s| s.len()).sum();
        let capacity = self.shards.iter().map(|s| s.capacity()).sum();
        self.metrics.snapshot(len, capacity)
    }
}

impl<K, V, E> CacheEngine<K, V> for ShardedCache<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: CacheEngine<K, V>,
{
    fn put(&self, key: K, value: V) {
        #[cfg(feature = "metrics")]
        self.metrics.record_put();
        self.shard_for(&key).put(key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        let hit = self.shard_for(key).get(key);
        #[cfg(feature = "metrics")]
        self.metrics.record_get(hit.is_some());
        hit
    }

    fn contains(&self, key: &K) -> bool {
        self.shard_for(key).contains(key)
    }

    /// Aggregate resident entries, bounded by `N × ⌈C/N⌉`.
    fn len(&self) -> usize {
        self.shards.iter().map(|s| s.len()).sum()
    }

    /// Aggregate capacity, `N × ⌈C/N⌉`.
    fn capacity(&self) -> usize {
        self.shards.iter().map(|s| s.capacity()).sum()
    }

    fn purge(&self) {
        for shard in &self.shards {
            shard.purge();
        }
    }
}

impl<K, V, E> ConcurrentCache for ShardedCache<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: CacheEngine<K, V> + ConcurrentCache,
{
}

impl<K, V> ShardedLruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Sharded LRU with `total_capacity` split across `shard_count`
    /// shards (0 ⇒ hardware parallelism).
    pub fn new(total_capacity: usize, shard_count: usize) -> Self {
        Self::with_engines(total_capacity, shard_count, LruCache::new)
    }
}

impl<K, V> ShardedLfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Sharded LFU with the default age-reduction threshold.
    pub fn new(total_capacity: usize, shard_count: usize) -> Self {
        Self::with_max_average(total_capacity, shard_count, DEFAULT_MAX_AVERAGE)
    }

    /// Sharded LFU with an explicit age-reduction threshold.
    pub fn with_max_average(
        total_capacity: usize,
        shard_count: usize,
        max_average: u64,
    ) -> Self {
        Self::with_engines(total_capacity, shard_count, |capacity| {
            LfuCache::with_max_average(capacity, max_average)
        })
    }
}

impl<K, V> ShardedLrukCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Sharded LRU-K; `history_capacity` and `k` apply per shard.
    pub fn new(
        total_capacity: usize,
        shard_count: usize,
        history_capacity: usize,
        k: u64,
    ) -> Self {
        Self::with_engines(total_capacity, shard_count, |capacity| {
            LrukCache::new(capacity, history_capacity, k)
        })
    }
}

impl<K, V> ShardedArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Sharded ARC with the default transform threshold.
    pub fn new(total_capacity: usize, shard_count: usize) -> Self {
        Self::with_threshold(total_capacity, shard_count, DEFAULT_TRANSFORM_THRESHOLD)
    }

    /// Sharded ARC with an explicit transform threshold.
    pub fn with_threshold(
        total_capacity: usize,
        shard_count: usize,
        transform_threshold: u64,
    ) -> Self {
        Self::with_engines(total_capacity, shard_count, |capacity| {
            ArcCache::with_threshold(capacity, transform_threshold)
        })
    }
}
