use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use log::{debug, info, warn};

use crate::assets::handle::AssetHandle;
use crate::assets::prefab::Prefab;
use crate::assets::storage::{AssetStorage, Fetch};
use crate::errors::{Error, LoadFailure, Result};

/// Turns a logical model path into a parsed template.
pub trait ModelLoader: Send + Sync + 'static {
    fn load_model(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = std::result::Result<Prefab, LoadFailure>> + Send;
}

impl<L: ModelLoader> ModelLoader for Arc<L> {
    fn load_model(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = std::result::Result<Prefab, LoadFailure>> + Send {
        (**self).load_model(path)
    }
}

/// Counters describing how requests were served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Underlying loads started
    pub loads: u64,
    /// Requests served from a stored entry
    pub hits: u64,
    /// Requests that awaited another caller's in-flight load
    pub joins: u64,
    /// Loads that failed
    pub failures: u64,
}

#[derive(Default)]
struct Counters {
    loads: AtomicU64,
    hits: AtomicU64,
    joins: AtomicU64,
    failures: AtomicU64,
}

/// Process-wide model cache, deduplicated by path.
///
/// Concurrent first requests for the same path await a single load. Failed
/// loads are not stored, so a later request retries.
pub struct AssetCache<M: ModelLoader> {
    loader: Arc<M>,
    storage: AssetStorage<String, AssetHandle>,
    counters: Arc<Counters>,
}

impl<M: ModelLoader> AssetCache<M> {
    pub fn new(loader: M) -> Self {
        Self {
            loader: Arc::new(loader),
            storage: AssetStorage::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    #[inline]
    pub fn loader(&self) -> &M {
        &self.loader
    }

    /// Returns the cached handle for `path`, loading it on first request.
    pub async fn get_or_load(&self, path: &str) -> Result<AssetHandle> {
        if path.is_empty() {
            return Err(Error::AssetLoad {
                path: String::new(),
                source: LoadFailure::Decode("empty asset path".to_string()),
            });
        }

        let fetch = self.storage.fetch(path.to_string(), || {
            let loader = Arc::clone(&self.loader);
            let counters = Arc::clone(&self.counters);
            let path = path.to_string();
            async move {
                let started = Instant::now();
                match loader.load_model(&path).await {
                    Ok(prefab) => {
                        info!(
                            "Loaded model '{}' ({} nodes, {} primitives) in {:.1?}",
                            path,
                            prefab.nodes.len(),
                            prefab.primitive_count(),
                            started.elapsed()
                        );
                        Ok(AssetHandle::new(&path, prefab))
                    }
                    Err(source) => {
                        counters.failures.fetch_add(1, Ordering::Relaxed);
                        warn!("Failed to load model '{path}': {source}");
                        Err(Error::AssetLoad { path, source })
                    }
                }
            }
        });

        match &fetch {
            Fetch::Hit(_) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Asset cache hit: {path}");
            }
            Fetch::Joined(_) => {
                self.counters.joins.fetch_add(1, Ordering::Relaxed);
                debug!("Joining in-flight load: {path}");
            }
            Fetch::Started(_) => {
                self.counters.loads.fetch_add(1, Ordering::Relaxed);
                debug!("Asset cache miss, loading: {path}");
            }
        }

        fetch.into_result().await
    }

    /// Loaded handle for `path`, without triggering a load.
    pub fn get(&self, path: &str) -> Option<AssetHandle> {
        self.storage.get(&path.to_string())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.storage.contains(&path.to_string())
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Drops the cache's reference to `path`.
    ///
    /// Holders of the returned (or any other) handle keep the template alive;
    /// the next request loads it again.
    pub fn evict(&self, path: &str) -> Option<AssetHandle> {
        let evicted = self.storage.remove(&path.to_string());
        if evicted.is_some() {
            debug!("Evicted model '{path}'");
        }
        evicted
    }

    pub fn clear(&self) {
        self.storage.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            loads: self.counters.loads.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            joins: self.counters.joins.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }
}
