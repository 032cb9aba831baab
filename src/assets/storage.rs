use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::errors::Result;

/// In-flight load that every concurrent requester awaits.
pub type SharedLoad<V> = Shared<BoxFuture<'static, Result<V>>>;

enum Slot<V> {
    Ready(V),
    Loading { id: u64, load: SharedLoad<V> },
}

/// How a [`AssetStorage::fetch`] call was served.
pub enum Fetch<V: Clone> {
    /// Value was already stored; no I/O.
    Hit(V),
    /// Another caller's load is in flight; this caller awaits it.
    Joined(SharedLoad<V>),
    /// This caller started the load.
    Started(SharedLoad<V>),
}

impl<V: Clone> Fetch<V> {
    pub async fn into_result(self) -> Result<V> {
        match self {
            Fetch::Hit(value) => Ok(value),
            Fetch::Joined(load) | Fetch::Started(load) => load.await,
        }
    }
}

/// Keyed storage with at-most-once population per key.
///
/// A failed load removes its own entry so the next request retries; a value
/// is only stored when the load that produced it is still the registered one
/// (an `evict` or `clear` during the load wins).
pub struct AssetStorage<K, V> {
    inner: Arc<RwLock<FxHashMap<K, Slot<V>>>>,
    next_load_id: AtomicU64,
}

impl<K, V> Default for AssetStorage<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> AssetStorage<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(FxHashMap::default())),
            next_load_id: AtomicU64::new(1),
        }
    }

    /// [Write] Returns the stored value, joins an in-flight load, or starts
    /// `load` and registers it under `key`.
    ///
    /// `load` is only invoked on a miss. The returned future must be polled by
    /// at least one requester for the load to make progress.
    pub fn fetch<F, Fut>(&self, key: K, load: F) -> Fetch<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let mut guard = self.inner.write();
        match guard.get(&key) {
            Some(Slot::Ready(value)) => return Fetch::Hit(value.clone()),
            Some(Slot::Loading { load, .. }) => return Fetch::Joined(load.clone()),
            None => {}
        }

        let id = self.next_load_id.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let settle_key = key.clone();
        let pending = load();

        let shared = async move {
            let result = pending.await;
            let mut guard = inner.write();
            let registered =
                matches!(guard.get(&settle_key), Some(Slot::Loading { id: current, .. }) if *current == id);
            if registered {
                match &result {
                    Ok(value) => {
                        guard.insert(settle_key, Slot::Ready(value.clone()));
                    }
                    Err(_) => {
                        guard.remove(&settle_key);
                    }
                }
            }
            result
        }
        .boxed()
        .shared();

        guard.insert(
            key,
            Slot::Loading {
                id,
                load: shared.clone(),
            },
        );
        Fetch::Started(shared)
    }

    /// [Read] Gets a fully loaded value.
    pub fn get(&self, key: &K) -> Option<V> {
        match self.inner.read().get(key) {
            Some(Slot::Ready(value)) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        matches!(self.inner.read().get(key), Some(Slot::Ready(_)))
    }

    pub fn is_loading(&self, key: &K) -> bool {
        matches!(self.inner.read().get(key), Some(Slot::Loading { .. }))
    }

    /// Number of fully loaded entries.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// [Write] Drops the entry for `key`, loaded or in flight.
    /// Returns the loaded value, if there was one.
    pub fn remove(&self, key: &K) -> Option<V> {
        match self.inner.write().remove(key) {
            Some(Slot::Ready(value)) => Some(value),
            _ => None,
        }
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Error, LoadFailure};
    use std::sync::atomic::AtomicUsize;

    fn failing() -> Error {
        Error::AssetLoad {
            path: "x".into(),
            source: LoadFailure::Decode("bad".into()),
        }
    }

    #[tokio::test]
    async fn concurrent_fetches_share_one_load() {
        let storage: AssetStorage<&'static str, u32> = AssetStorage::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let start = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Ok(7)
            }
        };

        let a = storage.fetch("k", start(Arc::clone(&calls)));
        let b = storage.fetch("k", start(Arc::clone(&calls)));
        assert!(matches!(a, Fetch::Started(_)));
        assert!(matches!(b, Fetch::Joined(_)));
        assert!(storage.is_loading(&"k"));

        let (a, b) = futures::join!(a.into_result(), b.into_result());
        assert_eq!((a.unwrap(), b.unwrap()), (7, 7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let c = storage.fetch("k", start(Arc::clone(&calls)));
        assert!(matches!(c, Fetch::Hit(7)));
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn failed_load_leaves_no_entry() {
        let storage: AssetStorage<&'static str, u32> = AssetStorage::new();
        let result = storage
            .fetch("k", || async { Err(failing()) })
            .into_result()
            .await;
        assert!(result.is_err());
        assert!(!storage.contains(&"k"));
        assert!(!storage.is_loading(&"k"));

        let retry = storage.fetch("k", || async { Ok(1) });
        assert!(matches!(retry, Fetch::Started(_)));
        assert_eq!(retry.into_result().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn removal_during_load_is_not_undone() {
        let storage: AssetStorage<&'static str, u32> = AssetStorage::new();
        let fetch = storage.fetch("k", || async {
            tokio::task::yield_now().await;
            Ok(3)
        });
        storage.remove(&"k");
        assert_eq!(fetch.into_result().await.unwrap(), 3);
        assert!(storage.is_empty());
    }
}
