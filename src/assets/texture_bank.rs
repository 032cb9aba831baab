use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use glam::Vec2;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::assets::storage::{AssetStorage, Fetch};
use crate::errors::{Error, LoadFailure, Result};
use crate::resources::texture::{ColorSpace, MAX_ANISOTROPY, Texture, TextureChannel, TextureSampler};
use crate::resources::texture_set::TextureSet;

/// Turns a logical image path into a decoded texture.
pub trait TextureLoader: Send + Sync + 'static {
    fn load_texture(
        &self,
        path: &str,
        color_space: ColorSpace,
    ) -> impl std::future::Future<Output = std::result::Result<Texture, LoadFailure>> + Send;
}

impl<L: TextureLoader> TextureLoader for Arc<L> {
    fn load_texture(
        &self,
        path: &str,
        color_space: ColorSpace,
    ) -> impl std::future::Future<Output = std::result::Result<Texture, LoadFailure>> + Send {
        (**self).load_texture(path, color_space)
    }
}

/// Where the surface-detail textures live and how they are sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureBankConfig {
    pub diffuse: String,
    pub normal: String,
    pub roughness: String,
    /// UV repeat factor `[u, v]`
    pub repeat: [f32; 2],
    /// Anisotropic filtering level, `1..=16`
    pub anisotropy: u16,
}

impl TextureBankConfig {
    #[must_use]
    pub fn path(&self, channel: TextureChannel) -> &str {
        match channel {
            TextureChannel::Diffuse => &self.diffuse,
            TextureChannel::Normal => &self.normal,
            TextureChannel::Roughness => &self.roughness,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for channel in TextureChannel::ALL {
            if self.path(channel).is_empty() {
                return Err(Error::Config(format!("{channel} texture path is empty")));
            }
        }
        if self.repeat.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            return Err(Error::Config(format!(
                "texture repeat {:?} must be positive",
                self.repeat
            )));
        }
        if !(1..=MAX_ANISOTROPY).contains(&self.anisotropy) {
            return Err(Error::Config(format!(
                "anisotropy {} outside 1..={MAX_ANISOTROPY}",
                self.anisotropy
            )));
        }
        Ok(())
    }

    /// Tiling policy applied to every channel.
    fn configure(&self, mut texture: Texture) -> Texture {
        texture.sampler = TextureSampler::repeating(self.anisotropy);
        texture.transform.repeat = Vec2::from_array(self.repeat);
        texture.generate_mipmaps = true;
        texture
    }
}

/// Owner of the process-wide surface-detail texture set.
///
/// The set is built lazily on first demand, shared by every translucent
/// material afterwards, and released only by [`TextureBank::teardown`].
pub struct TextureBank<T: TextureLoader> {
    loader: Arc<T>,
    config: Arc<TextureBankConfig>,
    storage: AssetStorage<(), Arc<TextureSet>>,
    loads: Arc<AtomicU64>,
}

impl<T: TextureLoader> TextureBank<T> {
    pub fn new(loader: T, config: TextureBankConfig) -> Self {
        Self {
            loader: Arc::new(loader),
            config: Arc::new(config),
            storage: AssetStorage::new(),
            loads: Arc::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    pub fn config(&self) -> &TextureBankConfig {
        &self.config
    }

    #[inline]
    pub fn loader(&self) -> &T {
        &self.loader
    }

    /// Returns the texture set, loading the three channels on first call.
    ///
    /// Any channel failure discards the whole set; the next call retries.
    pub async fn ensure_loaded(&self) -> Result<Arc<TextureSet>> {
        let fetch = self.storage.fetch((), || {
            let loader = Arc::clone(&self.loader);
            let config = Arc::clone(&self.config);
            let loads = Arc::clone(&self.loads);
            async move {
                loads.fetch_add(1, Ordering::Relaxed);
                let started = Instant::now();
                let load = |channel: TextureChannel| {
                    let loader = &loader;
                    let config = &config;
                    async move {
                        let path = config.path(channel);
                        match loader.load_texture(path, channel.color_space()).await {
                            Ok(texture) => Ok(config.configure(texture)),
                            Err(source) => Err(Error::TextureLoad {
                                channel,
                                path: path.to_string(),
                                source,
                            }),
                        }
                    }
                };

                let result = futures::try_join!(
                    load(TextureChannel::Diffuse),
                    load(TextureChannel::Normal),
                    load(TextureChannel::Roughness),
                );
                match result {
                    Ok((diffuse, normal, roughness)) => {
                        info!(
                            "Texture bank ready (repeat {:?}, anisotropy {}) in {:.1?}",
                            config.repeat,
                            config.anisotropy,
                            started.elapsed()
                        );
                        Ok(Arc::new(TextureSet::new(diffuse, normal, roughness)))
                    }
                    Err(err) => {
                        warn!("Texture bank load failed, discarding set: {err}");
                        Err(err)
                    }
                }
            }
        });

        match &fetch {
            Fetch::Hit(_) => {}
            Fetch::Joined(_) => debug!("Joining in-flight texture bank load"),
            Fetch::Started(_) => debug!("Loading texture bank"),
        }
        fetch.into_result().await
    }

    /// Loaded set, without triggering a load.
    pub fn get(&self) -> Option<Arc<TextureSet>> {
        self.storage.get(&())
    }

    pub fn is_loaded(&self) -> bool {
        self.storage.contains(&())
    }

    /// Number of times the set was (attempted to be) populated.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// Releases the bank's reference to the set.
    ///
    /// Materials that still hold the set keep it alive; the next
    /// `ensure_loaded` loads a fresh one.
    pub fn teardown(&self) {
        if self.storage.remove(&()).is_some() {
            debug!("Texture bank torn down");
        }
    }
}
