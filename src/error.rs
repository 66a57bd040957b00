//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// A missing key is never an error: lookups report it as `None` and
/// `evict` reports it as `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Count limit must be strictly positive
    #[error("Invalid count limit: {0} (must be greater than zero)")]
    InvalidCountLimit(i64),

    /// A cache must start from an empty usage history
    #[error("Usage history already holds {0} keys")]
    NonEmptyHistory(usize),

    /// Stored value cannot be viewed as the requested type
    #[error("Type mismatch for key '{key}': requested {expected}, stored {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
