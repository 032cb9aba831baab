//! Asset Handle
//!
//! Reference-counted handle to a cached model template.
//!
//! # Design Principles
//! - Uses `Arc` for reference counting: the template lives as long as its
//!   longest holder (the cache, the resolver, or a scene instance)
//! - Handles compare by identity, so two requests for the same path can be
//!   checked for sharing the same cached data
//! - Weak handles (`WeakAssetHandle`) don't keep the template alive

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

use crate::assets::prefab::Prefab;

/// Strong handle to an immutable, cached [`Prefab`].
#[derive(Clone)]
pub struct AssetHandle {
    path: Arc<str>,
    prefab: Arc<Prefab>,
}

impl AssetHandle {
    /// Creates a handle owning a freshly loaded template.
    #[must_use]
    pub fn new(path: &str, prefab: Prefab) -> Self {
        Self {
            path: Arc::from(path),
            prefab: Arc::new(prefab),
        }
    }

    /// Logical path the template was loaded from
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn prefab(&self) -> &Arc<Prefab> {
        &self.prefab
    }

    /// Whether both handles refer to the same cached template.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &AssetHandle) -> bool {
        Arc::ptr_eq(&self.prefab, &other.prefab)
    }

    /// Number of live strong holders of the template.
    #[must_use]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.prefab)
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakAssetHandle {
        WeakAssetHandle {
            path: Arc::clone(&self.path),
            prefab: Arc::downgrade(&self.prefab),
        }
    }
}

impl Deref for AssetHandle {
    type Target = Prefab;

    fn deref(&self) -> &Prefab {
        &self.prefab
    }
}

impl PartialEq for AssetHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for AssetHandle {}

impl fmt::Debug for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("path", &self.path)
            .field("nodes", &self.prefab.nodes.len())
            .field("strong_count", &self.strong_count())
            .finish()
    }
}

/// Weak asset handle.
///
/// Doesn't prevent the template from being released.
#[derive(Clone)]
pub struct WeakAssetHandle {
    path: Arc<str>,
    prefab: Weak<Prefab>,
}

impl WeakAssetHandle {
    /// Attempts to upgrade to a strong handle.
    #[must_use]
    pub fn upgrade(&self) -> Option<AssetHandle> {
        self.prefab.upgrade().map(|prefab| AssetHandle {
            path: Arc::clone(&self.path),
            prefab,
        })
    }

    /// Checks whether the template is still alive
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.prefab.strong_count() > 0
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Debug for WeakAssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakAssetHandle")
            .field("path", &self.path)
            .field("alive", &self.is_alive())
            .finish()
    }
}
