use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::ds::OrderedIndex;

#[derive(Debug)]
/// Per-frequency buckets of keys with a `min_freq` watermark.
///
/// Each bucket keeps its keys in insertion order, so the stale end of the
/// minimum bucket is the LFU victim with LRU tie-break. Values live in the
/// owning engine; this structure tracks keys and counters only.
pub struct FrequencyBuckets<K> {
    freqs: FxHashMap<K, u64>,
    buckets: FxHashMap<u64, OrderedIndex<K, ()>>,
    // 0 means unset (empty structure or stale after evict_min).
    min_freq: u64,
}

impl<K> FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            freqs: FxHashMap::default(),
            buckets: FxHashMap::default(),
            min_freq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.freqs.contains_key(key)
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.freqs.get(key).copied()
    }

    pub fn min_freq(&self) -> Option<u64> {
        if self.min_freq == 0 {
            None
        } else {
            Some(self.min_freq)
        }
    }

    /// Tracks a new key at frequency 1 and resets `min_freq` to 1.
    ///
    /// Returns `false` if the key is already tracked.
    pub fn insert(&mut self, key: K) -> bool {
        if self.freqs.contains_key(&key) {
            return false;
        }
        self.freqs.insert(key.clone(), 1);
        self.buckets.entry(1).or_default().push_back(key, ());
        self.min_freq = 1;
        true
    }

    /// Promotes `key` from its bucket to the next one, returning the new
    /// frequency.
    ///
    /// If the old bucket empties and it was the minimum, `min_freq`
    /// advances with the entry.
    pub fn promote(&mut self, key: &K) -> Option<u64> {
        let freq = *self.freqs.get(key)?;
        let next = freq.saturating_add(1);
        if next == freq {
            // Counter saturated; just refresh in-bucket position.
            let bucket = self.buckets.get_mut(&freq).expect("bucket missing");
            bucket.move_to_back(key);
            return Some(freq);
        }

        let emptied = {
            let bucket = self.buckets.get_mut(&freq).expect("bucket missing");
            bucket.remove(key);
            bucket.is_empty()
        };
        if emptied {
            self.buckets.remove(&freq);
            if self.min_freq == freq {
                self.min_freq = next;
            }
        }

        self.buckets.entry(next).or_default().push_back(key.clone(), ());
        self.freqs.insert(key.clone(), next);
        Some(next)
    }

    /// Removes and returns the stale-end key of the minimum bucket.
    ///
    /// `min_freq` must be accurate when this is called (it is immediately
    /// before any eviction decision). The watermark is left untouched even
    /// if the bucket empties: callers either reset it via a subsequent
    /// [`insert`](Self::insert) or rescan with
    /// [`refresh_min`](Self::refresh_min).
    pub fn evict_min(&mut self) -> Option<(K, u64)> {
        if self.freqs.is_empty() {
            return None;
        }
        let freq = self.min_freq;
        debug_assert!(self.buckets.contains_key(&freq), "stale min_freq at eviction");
        let bucket = self.buckets.get_mut(&freq)?;
        let (key, ()) = bucket.pop_front()?;
        if bucket.is_empty() {
            self.buckets.remove(&freq);
        }
        self.freqs.remove(&key);
        Some((key, freq))
    }

    /// Rescans for the smallest non-empty bucket (0 when empty).
    pub fn refresh_min(&mut self) {
        self.min_freq = self.buckets.keys().copied().min().unwrap_or(0);
    }

    /// Subtracts `delta` from every frequency (clamped at 1), rebuilds the
    /// buckets, and recomputes `min_freq`.
    ///
    /// Relative order is preserved: buckets are drained in ascending
    /// frequency, stale end first, and entries re-linked in that order.
    pub fn scale_down(&mut self, delta: u64) {
        if self.freqs.is_empty() {
            return;
        }

        let mut old_freqs: Vec<u64> = self.buckets.keys().copied().collect();
        old_freqs.sort_unstable();

        let mut rebuilt: FxHashMap<u64, OrderedIndex<K, ()>> = FxHashMap::default();
        for freq in old_freqs {
            let mut bucket = self.buckets.remove(&freq).expect("bucket missing");
            let new_freq = freq.saturating_sub(delta).max(1);
            while let Some((key, ())) = bucket.pop_front() {
                self.freqs.insert(key.clone(), new_freq);
                rebuilt.entry(new_freq).or_default().push_back(key, ());
            }
        }

        self.buckets = rebuilt;
        self.refresh_min();
    }

    pub fn clear(&mut self) {
        self.freqs.clear();
        self.buckets.clear();
        self.min_freq = 0;
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let linked: usize = self.buckets.values().map(|b| b.len()).sum();
        assert_eq!(linked, self.freqs.len());
        for (freq, bucket) in &self.buckets {
            assert!(!bucket.is_empty(), "empty bucket retained");
            for (key, ()) in bucket.iter() {
                assert_eq!(self.freqs.get(key), Some(freq));
            }
            bucket.debug_validate_invariants();
        }
        if self.is_empty() {
            assert!(self.buckets.is_empty());
        }
    }
}

impl<K> Default for FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
