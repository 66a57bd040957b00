//! Cache Store Module
//!
//! Key → entry map backing the cache. Holds no recency information of its
//! own; each entry only carries its slot in the usage history.

use std::collections::HashMap;

use crate::cache::{CacheEntry, CachedValue, SlotId};

// == Store ==
/// Hash map from key to value and usage-history position.
#[derive(Debug, Default)]
pub struct Store {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
}

impl Store {
    // == Constructor ==
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    // == Upsert ==
    /// Inserts or overwrites the entry for `key`.
    ///
    /// Returns true if the key was not present before.
    pub fn upsert(&mut self, key: String, value: CachedValue, position: SlotId) -> bool {
        self.entries
            .insert(key, CacheEntry::new(value, position))
            .is_none()
    }

    // == Lookup ==
    pub fn lookup(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    // == Remove ==
    /// Removes an entry, handing it back to the caller.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        self.entries.remove(key)
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
