//! Hit/miss counters for the concurrent engines (feature `metrics`).
//!
//! Each engine counts `get` calls, hits, misses, and `put` calls with
//! relaxed atomics at the wrapper level and exposes
//! `metrics_snapshot()`; the sharded wrapper counts routed operations the
//! same way. This is the library-side support for hit-rate reporting by
//! an external benchmark harness.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of an engine's operation counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub put_calls: u64,

    // gauges captured at snapshot time
    pub len: usize,
    pub capacity: usize,
}

impl CacheMetricsSnapshot {
    /// Fraction of `get` calls that hit, or 0.0 before any call.
    pub fn hit_rate(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct EngineMetrics {
    get_calls: AtomicU64,
    get_hits: AtomicU64,
    get_misses: AtomicU64,
    put_calls: AtomicU64,
}

impl EngineMetrics {
    pub(crate) fn record_get(&self, hit: bool) {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.get_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.get_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_put(&self) {
        self.put_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, len: usize, capacity: usize) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            get_calls: self.get_calls.load(Ordering::Relaxed),
            get_hits: self.get_hits.load(Ordering::Relaxed),
            get_misses: self.get_misses.load(Ordering::Relaxed),
            put_calls: self.put_calls.load(Ordering::Relaxed),
            len,
            capacity,
        }
    }
}
