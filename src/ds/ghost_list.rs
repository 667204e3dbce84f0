//! Bounded recency list for ghost entries.
//!
//! Tracks recently evicted keys without storing values, so adaptive
//! policies can detect that an evicted key is reappearing ("ghost hit")
//! and shift capacity toward the sub-cache that lost it. Implemented as an
//! [`OrderedIndex`] of keys with the fresh end as MRU.
//!
//! ## Record Flow (capacity = 3)
//!
//! ```text
//!   record("d") when full:
//!     1. "d" not tracked
//!     2. At capacity: discard stale end outright
//!     3. Link "d" at the fresh end
//!
//!   record("a") when present:
//!     1. "a" found
//!     2. Splice to fresh end, no eviction
//! ```
//!
//! A ghost hit is consumed with [`GhostList::remove`], and the list can be
//! re-bounded with [`GhostList::set_capacity`] when the sub-cache it
//! shadows grows or shrinks.
//!
//! ## Example
//!
//! ```
//! use cacheplex::ds::GhostList;
//!
//! let mut ghost = GhostList::new(2);
//! ghost.record("a");
//! ghost.record("b");
//! ghost.record("c");
//!
//! assert!(!ghost.contains(&"a")); // discarded at capacity
//! assert!(ghost.contains(&"b"));
//! assert!(ghost.remove(&"c"));    // ghost hit consumed
//! ```
//!
//! Not thread-safe; the owning engine's mutex covers it.

use std::hash::Hash;

use crate::ds::OrderedIndex;

#[derive(Debug)]
/// Bounded list of formerly resident keys, ordered by ghost insertion.
pub struct GhostList<K> {
    entries: OrderedIndex<K, ()>,
    capacity: usize,
}

impl<K> GhostList<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a ghost list holding at most `capacity` keys.
    ///
    /// A capacity of 0 creates a no-op list that ignores all records.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: OrderedIndex::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `key` is tracked; this is the ghost-hit check.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    /// Records `key` as most recently evicted.
    ///
    /// A key already present is spliced to the fresh end. At capacity the
    /// stale-end key is discarded outright.
    pub fn record(&mut self, key: K) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.move_to_back(&key) {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(key, ());
    }

    /// Removes `key`; returns `true` if it was tracked.
    ///
    /// Called after a ghost hit so the same eviction is not counted twice.
    pub fn remove(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Re-bounds the list to `capacity`, discarding stale-end keys that no
    /// longer fit. Tracks the owning sub-cache's capacity transfers.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.entries.len() > capacity {
            self.entries.pop_front();
        }
    }

    /// Drops all tracked keys.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert!(self.entries.len() <= self.capacity);
        self.entries.debug_validate_invariants();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ghost_list_records_and_evictions() {
        let mut ghost = GhostList::new(2);
        ghost.record("a");
        ghost.record("b");
        assert!(ghost.contains(&"a"));
        assert!(ghost.contains(&"b"));

        ghost.record("a");
        ghost.record("c");

        assert!(ghost.contains(&"a"));
        assert!(ghost.contains(&"c"));
        assert!(!ghost.contains(&"b"));
    }

    #[test]
    fn ghost_list_zero_capacity_is_noop() {
        let mut ghost = GhostList::new(0);
        ghost.record("a");
        assert!(ghost.is_empty());
        assert!(!ghost.contains(&"a"));
    }

    #[test]
    fn ghost_list_remove_existing_and_missing() {
        let mut ghost = GhostList::new(2);
        ghost.record("a");
        ghost.record("b");
        assert!(ghost.remove(&"a"));
        assert!(!ghost.contains(&"a"));
        assert_eq!(ghost.len(), 1);

        assert!(!ghost.remove(&"missing"));
        assert_eq!(ghost.len(), 1);
    }

    #[test]
    fn ghost_list_set_capacity_trims_stale_end() {
        let mut ghost = GhostList::new(3);
        ghost.record(1);
        ghost.record(2);
        ghost.record(3);

        ghost.set_capacity(1);
        assert_eq!(ghost.len(), 1);
        assert!(ghost.contains(&3)); // freshest survives
        assert!(!ghost.contains(&1));
        assert!(!ghost.contains(&2));

        // Growing leaves entries alone and admits more.
        ghost.set_capacity(2);
        ghost.record(4);
        assert!(ghost.contains(&3));
        assert!(ghost.contains(&4));
    }

    #[test]
    fn ghost_list_clear_resets_state() {
        let mut ghost = GhostList::new(2);
        ghost.record("a");
        ghost.record("b");
        ghost.clear();

        assert!(ghost.is_empty());
        assert!(!ghost.contains(&"a"));
        assert_eq!(ghost.capacity(), 2);
    }
}
