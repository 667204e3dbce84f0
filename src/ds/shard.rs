//! Deterministic shard selection for the sharded wrapper.
//!
//! Maps any `Hash`able key to a shard index in `[0, shards)`. The mapping
//! is a pure function of `(key, seed, shards)` and stays fixed for the
//! lifetime of the selector, so a key always routes to the same shard.
//!
//! `DefaultHasher` is used rather than the `FxHash` the indexes use:
//! shard routing takes `hash % N`, and small integer keys need the
//! low-bit dispersion of a full-avalanche hash to spread evenly.
//!
//! ## Example
//!
//! ```
//! use cacheplex::ds::ShardSelector;
//!
//! let selector = ShardSelector::new(4, 0);
//! let shard = selector.shard_for_key(&"user:123");
//! assert!(shard < 4);
//! assert_eq!(selector.shard_for_key(&"user:123"), shard);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic shard selector using a seeded hash.
#[derive(Debug, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards with the given `seed`.
    ///
    /// The shard count is clamped to at least 1.
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Maps a key to a shard index in `[0, shards)`.
    pub fn shard_for_key<K: Hash>(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards
    }
}

impl Default for ShardSelector {
    /// Creates a single-shard selector with seed 0.
    fn default() -> Self {
        Self::new(1, 0)
    }
}

/// Resolves a requested shard count: 0 means hardware parallelism.
pub(crate) fn resolve_shard_count(requested: usize) -> usize {
    if requested > 0 {
        requested
    } else {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}
