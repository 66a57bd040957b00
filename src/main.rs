//! Mini LRU - demo workload
//!
//! Builds a cache from environment configuration, drives a mixed read/write
//! workload through it and prints the resulting statistics as JSON.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_lru::{CacheConfig, LruCache};

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache and register an eviction listener
/// 4. Write `workload_keys` distinct items, re-reading every third one
/// 5. Print statistics
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_lru=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: count_limit={}, workload_keys={}",
        config.count_limit, config.workload_keys
    );

    let cache = LruCache::from_config(&config).context("failed to build cache")?;

    let evicted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evicted);
    cache.on_evicted(move |key, value| {
        counter.fetch_add(1, Ordering::Relaxed);
        debug!(key, type_name = value.type_name(), "evicted");
    });

    for i in 1..=config.workload_keys {
        cache.add(format!("itemId#{i}"), format!("itemContent#{i}"));

        if i % 3 == 0 {
            let key = format!("itemId#{}", i / 2 + 1);
            cache
                .get::<String>(&key)
                .with_context(|| format!("unexpected type stored under {key}"))?;
        }
    }

    info!(
        "Workload complete: {} entries live, {} listener notifications",
        cache.count(),
        evicted.load(Ordering::Relaxed)
    );

    let stats = serde_json::to_string_pretty(&cache.stats()).context("failed to encode stats")?;
    println!("{stats}");

    Ok(())
}
