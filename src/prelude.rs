pub use crate::builder::{Cache, CacheBuilder, EvictionPolicy};
pub use crate::ds::{FrequencyBuckets, GhostList, OrderedIndex, ShardSelector};
pub use crate::policy::arc::ArcCache;
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lru::LruCache;
pub use crate::policy::lru_k::LrukCache;
pub use crate::policy::sharded::{
    ShardedArcCache, ShardedCache, ShardedLfuCache, ShardedLruCache, ShardedLrukCache,
};
pub use crate::traits::{CacheEngine, ConcurrentCache};

#[cfg(feature = "metrics")]
pub use crate::metrics::CacheMetricsSnapshot;
