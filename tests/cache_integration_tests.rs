//! Integration Tests for the LRU cache
//!
//! Exercises the public API end to end: eviction order, typed retrieval,
//! listeners and concurrent access.

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread;

use mini_lru::{CacheConfig, CacheError, CachedValue, LruCache};

// == Helper Functions ==

fn create_test_data(count: usize) -> Vec<(String, String)> {
    (1..=count)
        .map(|i| (format!("itemId#{i}"), format!("itemContent#{i}")))
        .collect()
}

fn create_cache_with_test_data(count_limit: usize, data_size: usize) -> LruCache {
    let cache = LruCache::new(count_limit).unwrap();
    for (key, value) in create_test_data(data_size) {
        cache.add(key, value);
    }
    cache
}

fn live_keys(cache: &LruCache) -> BTreeSet<String> {
    cache.keys().into_iter().collect()
}

// == Construction ==

#[test]
fn test_construction_rejects_non_positive_limits() {
    assert_eq!(
        LruCache::new(0).unwrap_err(),
        CacheError::InvalidCountLimit(0)
    );

    for limit in [0, -1] {
        let config = CacheConfig::default().with_count_limit(limit);
        assert_eq!(
            LruCache::from_config(&config).unwrap_err(),
            CacheError::InvalidCountLimit(limit)
        );
    }
}

// == Add / Get ==

#[test]
fn test_add_new_item() {
    let cache = LruCache::new(1000).unwrap();
    cache.add("sampleKey", "sample".to_string());

    assert_eq!(*cache.get::<String>("sampleKey").unwrap().unwrap(), "sample");
}

#[test]
fn test_get_existing_item() {
    for count_limit in [1, 5] {
        let data = create_test_data(count_limit);
        let cache = create_cache_with_test_data(count_limit, count_limit);
        let (key, value) = &data[count_limit / 2];

        assert_eq!(cache.count(), count_limit);
        assert_eq!(cache.get::<String>(key).unwrap().as_deref(), Some(value));
    }
}

#[test]
fn test_get_overflowed_item_is_none() {
    let data = create_test_data(4);
    let cache = create_cache_with_test_data(3, 4);

    assert!(cache.get::<String>(&data[0].0).unwrap().is_none());
    assert_eq!(cache.count(), 3);
}

#[test]
fn test_get_incompatible_type_fails() {
    let cache = LruCache::new(3).unwrap();
    cache.add("1", "testObj".to_string());

    let result = cache.get::<i32>("1");

    assert!(matches!(result, Err(CacheError::TypeMismatch { .. })));
}

#[test]
fn test_get_collection_and_trait_object() {
    let cache = LruCache::new(3).unwrap();
    cache.add("set", HashSet::<String>::new());
    cache.add(
        "shape",
        Arc::new(|| "circle") as Arc<dyn Fn() -> &'static str + Send + Sync>,
    );

    assert!(cache.get::<HashSet<String>>("set").unwrap().is_some());
    let shape = cache
        .get::<Arc<dyn Fn() -> &'static str + Send + Sync>>("shape")
        .unwrap()
        .unwrap();
    assert_eq!((**shape)(), "circle");
}

#[test]
fn test_heterogeneous_values() {
    let cache = LruCache::new(4).unwrap();
    cache.add("int", 7_i64);
    cache.add("text", "seven".to_string());
    cache.add("list", vec![7_u8; 3]);
    cache.add("unit", ());

    assert_eq!(*cache.get::<i64>("int").unwrap().unwrap(), 7);
    assert_eq!(*cache.get::<String>("text").unwrap().unwrap(), "seven");
    assert_eq!(*cache.get::<Vec<u8>>("list").unwrap().unwrap(), vec![7, 7, 7]);
    assert!(cache.get::<()>("unit").unwrap().is_some());
}

// == Eviction Order ==

#[test]
fn test_concrete_eviction_scenario() {
    let cache = LruCache::new(3).unwrap();
    let evicted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&evicted);
    cache.on_evicted(move |key, value| {
        let value = *value.downcast_ref::<i32>().unwrap();
        sink.lock().unwrap().push((key.to_string(), value));
    });

    cache.add("a", 1);
    cache.add("b", 2);
    cache.add("c", 3);
    assert_eq!(cache.count(), 3);

    cache.add("d", 4);
    assert_eq!(cache.count(), 3);
    assert!(cache.get::<i32>("a").unwrap().is_none());

    assert_eq!(*cache.get::<i32>("b").unwrap().unwrap(), 2);
    cache.add("e", 5);

    assert_eq!(
        *evicted.lock().unwrap(),
        vec![("a".to_string(), 1), ("c".to_string(), 3)]
    );
    assert_eq!(
        live_keys(&cache),
        ["b", "d", "e"]
            .iter()
            .map(|k| k.to_string())
            .collect::<BTreeSet<_>>()
    );
}

#[test]
fn test_touching_least_used_protects_it() {
    let cache = create_cache_with_test_data(3, 3);

    cache.get::<String>("itemId#1").unwrap();
    cache.add("itemId#4", "itemContent#4".to_string());

    assert!(cache.contains("itemId#1"));
    assert!(!cache.contains("itemId#2"));
    assert_eq!(cache.least_recently_used().as_deref(), Some("itemId#3"));
}

#[test]
fn test_readding_refreshes_recency() {
    let cache = create_cache_with_test_data(3, 3);

    cache.add("itemId#1", "updated".to_string());
    cache.add("itemId#4", "itemContent#4".to_string());

    assert_eq!(*cache.get::<String>("itemId#1").unwrap().unwrap(), "updated");
    assert!(!cache.contains("itemId#2"));
}

// == Evict ==

#[test]
fn test_evict_existing_item() {
    let cache = create_cache_with_test_data(3, 3);
    let removed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&removed);
    cache.on_evicted(move |key, value| {
        let value = value.downcast_ref::<&str>().copied();
        sink.lock().unwrap().push((key.to_string(), value));
    });

    assert!(cache.get_value("xKey").is_none());
    cache.add("xKey", "X");
    assert!(cache.get_value("xKey").is_some());

    assert!(cache.evict("xKey"));
    assert!(cache.get_value("xKey").is_none());
    assert_eq!(
        *removed.lock().unwrap(),
        vec![("itemId#1".to_string(), None), ("xKey".to_string(), Some("X"))]
    );
}

#[test]
fn test_evict_absent_item_leaves_cache_unchanged() {
    let cache = create_cache_with_test_data(3, 3);
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notifications);
    cache.on_evicted(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let before = cache.keys();

    assert!(!cache.evict("missing"));

    assert_eq!(cache.keys(), before);
    assert_eq!(notifications.load(Ordering::SeqCst), 0);
}

// == Listeners ==

#[test]
fn test_listener_not_fired_without_removal() {
    let cache = LruCache::new(2).unwrap();
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notifications);
    cache.on_evicted(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    cache.add("a", 1);
    cache.add("b", 2);
    cache.add("a", 3);
    cache.get::<i32>("b").unwrap();
    cache.get::<i32>("missing").unwrap();

    assert_eq!(notifications.load(Ordering::SeqCst), 0);
}

#[test]
fn test_listener_can_reenter_cache() {
    let cache = Arc::new(LruCache::new(2).unwrap());
    let weak: Weak<LruCache> = Arc::downgrade(&cache);
    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);

    cache.on_evicted(move |key, value| {
        if let Some(cache) = weak.upgrade() {
            // The cache lock is already released, so adding here is allowed
            if key == "a" {
                cache.add("archived:a", value.clone());
            }
            sink.lock().unwrap().push(key.to_string());
        }
    });

    cache.add("a", 1);
    cache.add("b", 2);
    cache.add("c", 3);

    // Archiving "a" pushed "b" out from inside the listener
    assert_eq!(*observed.lock().unwrap(), vec!["b".to_string(), "a".to_string()]);
    assert_eq!(cache.count(), 2);
    let archived = cache.get::<CachedValue>("archived:a").unwrap().unwrap();
    assert_eq!(archived.downcast_ref::<i32>(), Some(&1));
    assert!(cache.contains("c"));
}

// == Concurrency ==

#[test]
fn test_concurrent_access_respects_limit_and_notifies_once() {
    const THREADS: usize = 8;
    const ADDS_PER_THREAD: usize = 500;
    const LIMIT: usize = 64;

    let cache = Arc::new(LruCache::new(LIMIT).unwrap());
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notifications);
    cache.on_evicted(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..ADDS_PER_THREAD {
                    let key = format!("key_{t}_{i}");
                    cache.add(key.clone(), i);
                    let _ = cache.get::<usize>(&key);
                    if i % 7 == 0 {
                        cache.evict(&format!("key_{t}_{}", i / 2));
                    }
                    assert!(cache.count() <= LIMIT);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Every key was added exactly once: it is either still live or was
    // reported to the listener exactly once.
    assert_eq!(
        cache.count() + notifications.load(Ordering::SeqCst),
        THREADS * ADDS_PER_THREAD
    );
    assert!(cache.count() <= LIMIT);
    assert_eq!(cache.keys().len(), cache.count());
}

#[test]
fn test_concurrent_readers_see_consistent_values() {
    let cache = Arc::new(create_cache_with_test_data(16, 16));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for (key, value) in create_test_data(16).into_iter().cycle().take(400) {
                    let stored = cache.get::<String>(&key).unwrap().unwrap();
                    assert_eq!(*stored, value);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = cache.stats();
    assert_eq!(stats.hits, 1600);
    assert_eq!(stats.misses, 0);
    assert_eq!(stats.total_entries, 16);
}
