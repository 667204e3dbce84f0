//! Unified cache builder for all eviction policies.
//!
//! Selects the eviction policy at construction time and hands back a
//! [`Cache`] facade with a single `put`/`get` surface. Dispatch is a sum
//! type matched inline, so no vtable sits on the hot path.
//!
//! ## Example
//!
//! ```
//! use cacheplex::builder::{CacheBuilder, EvictionPolicy};
//! use cacheplex::traits::CacheEngine;
//!
//! let cache = CacheBuilder::new(100).build::<u64, String>(EvictionPolicy::Lru);
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::arc::{ArcCache, DEFAULT_TRANSFORM_THRESHOLD};
use crate::policy::lfu::{DEFAULT_MAX_AVERAGE, LfuCache};
use crate::policy::lru::LruCache;
use crate::policy::lru_k::LrukCache;
use crate::traits::{CacheEngine, ConcurrentCache};

/// Available eviction policies.
#[derive(Debug, Clone)]
pub enum EvictionPolicy {
    /// Least Recently Used eviction.
    Lru,
    /// Least Frequently Used eviction with periodic age reduction.
    Lfu { max_average: u64 },
    /// LRU with admission after `k` accesses; counters for not-yet-admitted
    /// keys live in a history LRU of `history_capacity` entries.
    LruK { history_capacity: usize, k: u64 },
    /// Adaptive recency/frequency composite with ghost-driven capacity
    /// transfer; entries move to the frequency side after
    /// `transform_threshold` accesses.
    Arc { transform_threshold: u64 },
}

impl EvictionPolicy {
    /// LFU with the default age-reduction threshold.
    pub fn lfu() -> Self {
        Self::Lfu {
            max_average: DEFAULT_MAX_AVERAGE,
        }
    }

    /// ARC with the default transform threshold.
    pub fn arc() -> Self {
        Self::Arc {
            transform_threshold: DEFAULT_TRANSFORM_THRESHOLD,
        }
    }
}

/// Policy-erased cache facade produced by [`CacheBuilder`].
pub struct Cache<K, V> {
    inner: CacheInner<K, V>,
}

enum CacheInner<K, V> {
    Lru(LruCache<K, V>),
    Lfu(LfuCache<K, V>),
    LruK(LrukCache<K, V>),
    Arc(ArcCache<K, V>),
}

impl<K, V> CacheEngine<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&self, key: K, value: V) {
        match &self.inner {
            CacheInner::Lru(cache) => cache.put(key, value),
            CacheInner::Lfu(cache) => cache.put(key, value),
            CacheInner::LruK(cache) => cache.put(key, value),
            CacheInner::Arc(cache) => cache.put(key, value),
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        match &self.inner {
            CacheInner::Lru(cache) => cache.get(key),
            CacheInner::Lfu(cache) => cache.get(key),
            CacheInner::LruK(cache) => cache.get(key),
            CacheInner::Arc(cache) => cache.get(key),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match &self.inner {
            CacheInner::Lru(cache) => cache.contains(key),
            CacheInner::Lfu(cache) => cache.contains(key),
            CacheInner::LruK(cache) => cache.contains(key),
            CacheInner::Arc(cache) => cache.contains(key),
        }
    }

    fn len(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(cache) => cache.len(),
            CacheInner::Lfu(cache) => cache.len(),
            CacheInner::LruK(cache) => cache.len(),
            CacheInner::Arc(cache) => cache.len(),
        }
    }

    fn capacity(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(cache) => cache.capacity(),
            CacheInner::Lfu(cache) => cache.capacity(),
            CacheInner::LruK(cache) => cache.capacity(),
            CacheInner::Arc(cache) => cache.capacity(),
        }
    }

    fn purge(&self) {
        match &self.inner {
            CacheInner::Lru(cache) => cache.purge(),
            CacheInner::Lfu(cache) => cache.purge(),
            CacheInner::LruK(cache) => cache.purge(),
            CacheInner::Arc(cache) => cache.purge(),
        }
    }
}

impl<K, V> ConcurrentCache for Cache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
}

/// Builder for creating cache instances.
pub struct CacheBuilder {
    capacity: usize,
}

impl CacheBuilder {
    /// Starts a builder for a cache of `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Builds a cache with the selected policy.
    ///
    /// Parameters are taken as given; use [`try_build`](Self::try_build)
    /// to have them validated instead.
    pub fn build<K, V>(self, policy: EvictionPolicy) -> Cache<K, V>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        let inner = match policy {
            EvictionPolicy::Lru => CacheInner::Lru(LruCache::new(self.capacity)),
            EvictionPolicy::Lfu { max_average } => {
                CacheInner::Lfu(LfuCache::with_max_average(self.capacity, max_average))
            },
            EvictionPolicy::LruK {
                history_capacity,
                k,
            } => CacheInner::LruK(LrukCache::new(self.capacity, history_capacity, k)),
            EvictionPolicy::Arc {
                transform_threshold,
            } => CacheInner::Arc(ArcCache::with_threshold(self.capacity, transform_threshold)),
        };
        Cache { inner }
    }

    /// Builds a cache with the selected policy, validating parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use cacheplex::builder::{CacheBuilder, EvictionPolicy};
    ///
    /// let bad = CacheBuilder::new(100)
    ///     .try_build::<u64, u64>(EvictionPolicy::LruK { history_capacity: 10, k: 0 });
    /// assert!(bad.is_err());
    /// ```
    pub fn try_build<K, V>(self, policy: EvictionPolicy) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        match &policy {
            EvictionPolicy::Lfu { max_average } if *max_average == 0 => {
                return Err(ConfigError::new("max_average must be >= 1"));
            },
            EvictionPolicy::LruK { k, .. } if *k == 0 => {
                return Err(ConfigError::new("k must be >= 1"));
            },
            _ => {},
        }
        Ok(self.build(policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_policies_basic_ops() {
        let policies = [
            EvictionPolicy::Lru,
            EvictionPolicy::lfu(),
            EvictionPolicy::LruK {
                history_capacity: 16,
                k: 1,
            },
            EvictionPolicy::arc(),
        ];

        for policy in policies {
            let cache = CacheBuilder::new(10).build::<u64, String>(policy.clone());

            cache.put(1, "one".to_string());
            cache.put(2, "two".to_string());
            assert_eq!(cache.len(), 2, "{policy:?}");

            assert_eq!(cache.get(&1), Some("one".to_string()), "{policy:?}");
            assert_eq!(cache.get(&3), None, "{policy:?}");
            assert!(cache.contains(&1), "{policy:?}");
            assert!(!cache.contains(&99), "{policy:?}");

            cache.put(1, "ONE".to_string());
            assert_eq!(cache.get(&1), Some("ONE".to_string()), "{policy:?}");

            cache.purge();
            assert!(cache.is_empty(), "{policy:?}");
        }
    }

    #[test]
    fn lru_policy_enforces_capacity() {
        let cache = CacheBuilder::new(2).build::<u64, u64>(EvictionPolicy::Lru);
        cache.put(1, 1);
        cache.put(2, 2);
        cache.put(3, 3); // evicts key 1

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&1));
        assert!(cache.contains(&2));
        assert!(cache.contains(&3));
    }

    #[test]
    fn try_build_validates_parameters() {
        assert!(
            CacheBuilder::new(10)
                .try_build::<u64, u64>(EvictionPolicy::LruK {
                    history_capacity: 4,
                    k: 0
                })
                .is_err()
        );
        assert!(
            CacheBuilder::new(10)
                .try_build::<u64, u64>(EvictionPolicy::Lfu { max_average: 0 })
                .is_err()
        );
        assert!(
            CacheBuilder::new(10)
                .try_build::<u64, u64>(EvictionPolicy::arc())
                .is_ok()
        );
    }

    #[test]
    fn policy_helpers_use_documented_defaults() {
        assert!(matches!(
            EvictionPolicy::lfu(),
            EvictionPolicy::Lfu { max_average: 10 }
        ));
        assert!(matches!(
            EvictionPolicy::arc(),
            EvictionPolicy::Arc {
                transform_threshold: 2
            }
        ));
    }
}
