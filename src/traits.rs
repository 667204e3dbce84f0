//! # Cache Engine Contract
//!
//! This module defines the uniform contract every eviction engine in the
//! library implements, regardless of policy (LRU, LFU, LRU-K, ARC, sharded).
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────────────────────────────────┐
//!                  │           CacheEngine<K, V>              │
//!                  │                                          │
//!                  │  put(&self, K, V)                        │
//!                  │  get(&self, &K) → Option<V>              │
//!                  │  get_or_default(&self, &K) → V           │
//!                  │  contains(&self, &K) → bool              │
//!                  │  len(&self) / is_empty(&self)            │
//!                  │  capacity(&self) → usize                 │
//!                  │  purge(&self)                            │
//!                  └───────────────────┬──────────────────────┘
//!                                      │
//!        ┌──────────┬─────────────┬────┴─────┬─────────────┬────────────┐
//!        ▼          ▼             ▼          ▼             ▼            ▼
//!   LruCache    LfuCache     LrukCache   ArcCache   ShardedCache    Cache
//!   (recency)  (frequency)  (admission) (adaptive)  (partition)   (facade)
//! ```
//!
//! ## Contract
//!
//! - Every operation is **total**: a `get` miss is `None`, a `put` on a
//!   zero-capacity engine is a no-op, a `put` on a full engine silently
//!   evicts per policy. No operation returns an error.
//! - Every operation takes `&self`: engines synchronize internally with a
//!   single mutex, so a shared reference (or an `Arc`) is all callers need
//!   for concurrent use. Operations on one engine linearize in
//!   lock-acquisition order; there is no cross-key or cross-shard ordering.
//! - Hits return **by-value copies**. Engines own their entries exclusively;
//!   callers never observe references into engine state. Values that are
//!   expensive to clone should be wrapped in `Arc` by the caller.
//!
//! ## Example
//!
//! ```
//! use cacheplex::traits::CacheEngine;
//! use cacheplex::policy::lru::LruCache;
//!
//! fn warm<C: CacheEngine<u64, String>>(cache: &C, data: &[(u64, String)]) {
//!     for (key, value) in data {
//!         cache.put(*key, value.clone());
//!     }
//! }
//!
//! let cache = LruCache::new(100);
//! warm(&cache, &[(1, "one".to_string()), (2, "two".to_string())]);
//! assert_eq!(cache.len(), 2);
//! ```

/// Uniform operations shared by every eviction engine.
///
/// # Type Parameters
///
/// - `K`: Key type; implementations require `Eq + Hash + Clone`
/// - `V`: Value type; implementations require `Clone`
pub trait CacheEngine<K, V> {
    /// Stores `value` under `key`.
    ///
    /// If the key is already resident its value is updated and its position
    /// refreshed per policy; otherwise an entry may be evicted first. A
    /// zero-capacity engine ignores the call.
    fn put(&self, key: K, value: V);

    /// Returns a copy of the value on hit, `None` on miss.
    ///
    /// A hit updates the policy's access state (recency position,
    /// frequency counter, access history). Use [`contains`](Self::contains)
    /// to check membership without touching access state.
    fn get(&self, key: &K) -> Option<V>;

    /// Returns the value on hit, or `V::default()` on miss.
    ///
    /// A miss still updates access history where the policy keeps one
    /// (LRU-K), exactly like [`get`](Self::get).
    ///
    /// # Example
    ///
    /// ```
    /// use cacheplex::traits::CacheEngine;
    /// use cacheplex::policy::lru::LruCache;
    ///
    /// let cache: LruCache<u32, u64> = LruCache::new(8);
    /// cache.put(1, 10);
    /// assert_eq!(cache.get_or_default(&1), 10);
    /// assert_eq!(cache.get_or_default(&2), 0);
    /// ```
    fn get_or_default(&self, key: &K) -> V
    where
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Returns `true` if `key` is resident, without updating access state.
    fn contains(&self, key: &K) -> bool;

    /// Returns the number of resident entries.
    fn len(&self) -> usize;

    /// Returns `true` if no entries are resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configured capacity in entries.
    fn capacity(&self) -> usize;

    /// Drops every resident entry and all policy bookkeeping (ghost lists,
    /// access histories, staged values). Capacity is unchanged.
    fn purge(&self);
}

/// Marker trait for engines that are safe to share across threads.
///
/// Every engine in this library implements it when `K` and `V` are `Send`;
/// the per-engine mutex provides the synchronization.
///
/// # Example
///
/// ```
/// use cacheplex::traits::{CacheEngine, ConcurrentCache};
///
/// fn spawn_writers<C>(cache: &C)
/// where
///     C: CacheEngine<u64, u64> + ConcurrentCache,
/// {
///     // Safe to hand to multiple threads.
/// }
/// ```
pub trait ConcurrentCache: Send + Sync {}
