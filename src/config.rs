//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

/// Default number of items a cache holds.
pub const DEFAULT_COUNT_LIMIT: i64 = 1000;

/// Default number of distinct keys written by the demo workload.
pub const DEFAULT_WORKLOAD_KEYS: usize = 2500;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// `count_limit` is kept signed so that a negative value coming from the
/// environment is rejected when the cache is built instead of wrapping.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub count_limit: i64,
    /// Number of distinct keys the demo binary writes
    pub workload_keys: usize,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_COUNT_LIMIT` - Maximum cache entries (default: 1000)
    /// - `DEMO_WORKLOAD_KEYS` - Keys written by the demo binary (default: 2500)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// Missing or unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            count_limit: lookup("CACHE_COUNT_LIMIT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_COUNT_LIMIT),
            workload_keys: lookup("DEMO_WORKLOAD_KEYS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_WORKLOAD_KEYS),
        }
    }

    /// Sets the count limit
    pub fn with_count_limit(mut self, count_limit: i64) -> Self {
        self.count_limit = count_limit;
        self
    }

    /// Sets the number of demo workload keys
    pub fn with_workload_keys(mut self, workload_keys: usize) -> Self {
        self.workload_keys = workload_keys;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            count_limit: DEFAULT_COUNT_LIMIT,
            workload_keys: DEFAULT_WORKLOAD_KEYS,
        }
    }
}
