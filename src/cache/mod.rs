//! Cache Module
//!
//! Provides a bounded in-memory cache with LRU eviction and typed retrieval.

mod engine;
mod entry;
mod history;
mod stats;
mod store;


// Re-export public types
pub use engine::{EvictionListener, ListenerId, LruCache};
pub use entry::{CacheEntry, CachedValue};
pub use history::{LinkedHistory, SlotId, UsageHistory};
pub use stats::CacheStats;
pub use store::Store;
