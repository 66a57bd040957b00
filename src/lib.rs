//! Mini LRU - A bounded, thread-safe in-process cache
//!
//! Stores values of any type under string keys, evicts the least recently
//! used entry once the configured item count is exceeded, and notifies
//! registered listeners of every removal.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheStats, CachedValue, ListenerId, LruCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
