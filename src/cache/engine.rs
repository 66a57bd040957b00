//! Cache Engine Module
//!
//! Public LRU cache combining the store and the usage history under a single
//! reader-writer lock, with eviction listeners fired after the lock is released.

use std::any::{type_name, Any};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::{debug, info, trace};

use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheEntry, CacheStats, CachedValue, LinkedHistory, Store, UsageHistory};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// Upper bound on the capacity reserved up front; larger caches grow on demand.
const MAX_PREALLOCATED: usize = 1024;

/// Callback invoked with the key and value of every removed entry.
pub type EvictionListener = Arc<dyn Fn(&str, &CachedValue) + Send + Sync>;

/// Handle returned by [`LruCache::on_evicted`], used to unregister a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

// == Guarded State ==
/// Store and usage history; only ever touched together under one lock.
#[derive(Debug)]
struct Inner<H> {
    store: Store,
    history: H,
}

impl<H: UsageHistory> Inner<H> {
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.store.remove(key)?;
        self.history.remove(key);
        Some(entry)
    }

    /// Drops the head of the usage history.
    fn evict_least_used(&mut self) -> Option<(String, CacheEntry)> {
        let key = self.history.least_used()?.to_owned();
        self.history.remove(&key);
        match self.store.remove(&key) {
            Some(entry) => Some((key, entry)),
            None => panic!("usage history holds key '{key}' missing from the store"),
        }
    }
}

// == LRU Cache ==
/// Bounded, thread-safe cache with least-recently-used eviction.
///
/// Values of any `'static + Send + Sync` type can be stored side by side and
/// are checked against the requested type on retrieval. Share the cache
/// between threads with an `Arc`.
///
/// ```
/// use mini_lru::LruCache;
///
/// let cache = LruCache::new(2).unwrap();
/// cache.add("a", 1_i32);
/// cache.add("b", "two".to_string());
/// cache.add("c", 3.0_f64); // evicts "a"
///
/// assert!(cache.get::<i32>("a").unwrap().is_none());
/// assert_eq!(*cache.get::<String>("b").unwrap().unwrap(), "two");
/// assert!(cache.get::<i32>("c").is_err());
/// ```
pub struct LruCache<H = LinkedHistory> {
    inner: RwLock<Inner<H>>,
    count_limit: usize,
    listeners: RwLock<Vec<(ListenerId, EvictionListener)>>,
    next_listener_id: AtomicU64,
    stats: StatsRecorder,
}

impl LruCache<LinkedHistory> {
    // == Constructor ==
    /// Creates a cache holding at most `count_limit` entries.
    ///
    /// Fails with [`CacheError::InvalidCountLimit`] if `count_limit` is zero.
    pub fn new(count_limit: usize) -> Result<Self> {
        let history = LinkedHistory::with_capacity(count_limit.min(MAX_PREALLOCATED));
        Self::with_history(history, count_limit)
    }

    /// Creates a cache from configuration.
    ///
    /// Any `count_limit` below one, negative values included, is rejected.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        let count_limit = usize::try_from(config.count_limit)
            .map_err(|_| CacheError::InvalidCountLimit(config.count_limit))?;
        Self::new(count_limit)
    }
}

impl<H: UsageHistory> LruCache<H> {
    /// Creates a cache on top of a caller-supplied usage history.
    ///
    /// Fails with [`CacheError::NonEmptyHistory`] if the history already
    /// records keys, since the store would not hold their values.
    pub fn with_history(history: H, count_limit: usize) -> Result<Self> {
        if count_limit == 0 {
            return Err(CacheError::InvalidCountLimit(0));
        }
        if !history.is_empty() {
            return Err(CacheError::NonEmptyHistory(history.len()));
        }

        info!(count_limit, "LRU cache created");

        Ok(Self {
            inner: RwLock::new(Inner {
                store: Store::with_capacity(count_limit.min(MAX_PREALLOCATED)),
                history,
            }),
            count_limit,
            listeners: RwLock::new(Vec::new()),
            next_listener_id: AtomicU64::new(0),
            stats: StatsRecorder::default(),
        })
    }

    // == Add ==
    /// Stores `value` under `key`, replacing any previous value and marking
    /// the key as most recently used.
    ///
    /// If the cache grows past its count limit, the least recently used entry
    /// is evicted and listeners are notified once the lock is released.
    pub fn add<T>(&self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        let key = key.into();
        let value = CachedValue::new(value);

        let evicted = {
            let mut inner = self.inner.write();
            let position = inner.history.record(&key);
            let inserted = inner.store.upsert(key.clone(), value, position);
            trace!(key = %key, inserted, "entry stored");

            if inner.store.len() > self.count_limit {
                inner.evict_least_used()
            } else {
                None
            }
        };

        if let Some((evicted_key, entry)) = evicted {
            self.stats.record_eviction();
            debug!(key = %evicted_key, "least recently used entry evicted");
            self.notify(&evicted_key, &entry.value);
        }
    }

    // == Get ==
    /// Retrieves the value stored under `key` as a `T`.
    ///
    /// Returns `Ok(None)` if the key is absent and
    /// [`CacheError::TypeMismatch`] if the stored value is not a `T`. Only a
    /// successful read marks the key as most recently used.
    ///
    /// `T` must be exactly the stored type (same `TypeId`); there is no
    /// coercion to a trait the stored type implements. To read a value
    /// through a trait, store it as the trait object type, e.g.
    /// `Arc<dyn Trait + Send + Sync>`, and request that type.
    pub fn get<T>(&self, key: &str) -> Result<Option<Arc<T>>>
    where
        T: Any + Send + Sync,
    {
        self.fetch(key, |value| {
            value.downcast::<T>().ok_or_else(|| CacheError::TypeMismatch {
                key: key.to_owned(),
                expected: type_name::<T>(),
                found: value.type_name(),
            })
        })
    }

    /// Untyped retrieval: returns the stored value without a type check.
    pub fn get_value(&self, key: &str) -> Option<CachedValue> {
        // The view below cannot fail
        self.fetch(key, |value| Ok(value.clone())).unwrap_or(None)
    }

    /// Looks up `key`, applies `view` to its value and touches the key if the
    /// view succeeds. The touch happens under the same lock as the lookup.
    ///
    /// Misses and failed views are settled under a plain read lock, so they
    /// do not queue behind the single upgradable guard.
    fn fetch<R>(
        &self,
        key: &str,
        view: impl Fn(&CachedValue) -> Result<R>,
    ) -> Result<Option<R>> {
        {
            let inner = self.inner.read();
            let Some(entry) = inner.store.lookup(key) else {
                self.stats.record_miss();
                return Ok(None);
            };
            view(&entry.value)?;
        }

        // The entry may have changed since the read lock was dropped
        let inner = self.inner.upgradable_read();

        let Some(entry) = inner.store.lookup(key) else {
            self.stats.record_miss();
            return Ok(None);
        };
        let position = entry.position;
        let result = view(&entry.value)?;

        let mut inner = RwLockUpgradableReadGuard::upgrade(inner);
        inner.history.touch(position);
        self.stats.record_hit();
        trace!(key, "entry touched");

        Ok(Some(result))
    }

    // == Evict ==
    /// Removes `key` from the cache.
    ///
    /// Returns true if the key was present; listeners are notified after the
    /// lock is released. Returns false and notifies nobody otherwise.
    pub fn evict(&self, key: &str) -> bool {
        let removed = self.inner.write().remove(key);

        match removed {
            Some(entry) => {
                self.stats.record_removal();
                debug!(key, "entry evicted on request");
                self.notify(key, &entry.value);
                true
            }
            None => false,
        }
    }

    // == Listeners ==
    /// Registers a listener called for every removed entry, whether evicted
    /// explicitly or by the LRU policy.
    ///
    /// Listeners run synchronously, in registration order, on the thread that
    /// removed the entry, after the cache lock has been released.
    pub fn on_evicted<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&str, &CachedValue) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::new(listener)));
        id
    }

    /// Unregisters a listener. Returns false if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }

    fn notify(&self, key: &str, value: &CachedValue) {
        // Snapshot so that listeners may register or remove listeners themselves
        let listeners: Vec<EvictionListener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(key, value);
        }
    }

    // == Inspection ==
    /// Current number of entries.
    pub fn count(&self) -> usize {
        self.inner.read().store.len()
    }

    /// Maximum number of entries, fixed at construction.
    pub fn count_limit(&self) -> usize {
        self.count_limit
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().store.is_empty()
    }

    /// Returns true if `key` is present, without touching it.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().store.lookup(key).is_some()
    }

    /// The key that the next eviction would remove.
    pub fn least_recently_used(&self) -> Option<String> {
        self.inner.read().history.least_used().map(str::to_owned)
    }

    pub fn most_recently_used(&self) -> Option<String> {
        self.inner.read().history.most_recently_used().map(str::to_owned)
    }

    /// All keys, from least to most recently used.
    pub fn keys(&self) -> Vec<String> {
        self.inner.read().history.keys()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.count())
    }
}

impl<H> std::fmt::Debug for LruCache<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCache")
            .field("count_limit", &self.count_limit)
            .field("listeners", &self.listeners.read().len())
            .finish_non_exhaustive()
    }
}
