//! Cache Entry Module
//!
//! Defines the type-erased value box and the per-key entry stored in the cache.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::cache::SlotId;

// == Cached Value ==
/// A value of any `'static + Send + Sync` type, stored together with the
/// name of its concrete type.
///
/// Cloning is cheap: clones share the same allocation.
#[derive(Clone)]
pub struct CachedValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl CachedValue {
    // == Constructor ==
    /// Boxes a value, remembering its concrete type.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Name of the stored type, as reported by [`std::any::type_name`].
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns true if the stored value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrows the stored value as a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Shares the stored value as an `Arc<T>`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }
}

impl fmt::Debug for CachedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// == Cache Entry ==
/// A live entry: the value and its position in the usage history.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: CachedValue,
    /// Slot of this key in the usage history
    pub(crate) position: SlotId,
}

impl CacheEntry {
    pub(crate) fn new(value: CachedValue, position: SlotId) -> Self {
        Self { value, position }
    }
}
