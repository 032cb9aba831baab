//! Variant resolution
//!
//! [`VariantResolver::resolve`] maps a variant to its model, fetches (or
//! reuses) the cached template, pulls the shared texture set when the variant
//! is translucent, and swaps every mesh material of the live scene instance.
//!
//! # Ordering
//!
//! Each call takes a sequencing token when it is issued. Only the holder of
//! the latest token may commit; an older resolution that finishes later is
//! reported as [`Resolution::Discarded`] and leaves the live scene alone. Its
//! loads still populate the asset cache and texture bank.
//!
//! # Failure
//!
//! Loading and synthesis errors propagate unchanged. Replacement materials are
//! staged on a copy of the instance and published only when every mesh
//! succeeded, so the previously published scene stays intact on failure.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::assets::cache::{AssetCache, ModelLoader};
use crate::assets::handle::AssetHandle;
use crate::assets::texture_bank::{TextureBank, TextureLoader};
use crate::config::ProductLine;
use crate::errors::Result;
use crate::pipeline::synthesizer::MaterialSynthesizer;
use crate::pipeline::variant::VariantId;
use crate::resources::texture_set::TextureSet;
use crate::scene::environment::Environment;
use crate::scene::instance::{MeshView, SceneInstance};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Idle,
    /// The latest issued resolution is still in flight.
    Resolving { variant: VariantId, token: u64 },
}

/// Outcome of a resolution that was overtaken by a newer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleResolutionDiscarded {
    pub variant: VariantId,
    pub token: u64,
    /// Token of the request that superseded this one
    pub latest: u64,
}

/// A committed resolution, ready for the renderer.
#[derive(Debug, Clone)]
pub struct ResolvedScene {
    pub variant: VariantId,
    pub token: u64,
    pub scene: Arc<SceneInstance>,
    /// Whether the previous instance was kept and only its materials changed
    pub reused_instance: bool,
    pub meshes_updated: usize,
}

#[derive(Debug, Clone)]
pub enum Resolution {
    Applied(ResolvedScene),
    Discarded(StaleResolutionDiscarded),
}

impl Resolution {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Resolution::Applied(_))
    }

    #[must_use]
    pub fn applied(&self) -> Option<&ResolvedScene> {
        match self {
            Resolution::Applied(resolved) => Some(resolved),
            Resolution::Discarded(_) => None,
        }
    }

    #[must_use]
    pub fn discarded(&self) -> Option<&StaleResolutionDiscarded> {
        match self {
            Resolution::Discarded(stale) => Some(stale),
            Resolution::Applied(_) => None,
        }
    }
}

struct Live {
    latest: u64,
    state: ResolverState,
    scene: Option<Arc<SceneInstance>>,
    variant: Option<VariantId>,
}

pub struct VariantResolver<M: ModelLoader, T: TextureLoader> {
    line: ProductLine,
    cache: Arc<AssetCache<M>>,
    textures: Arc<TextureBank<T>>,
    synthesizer: MaterialSynthesizer,
    environment: Environment,
    live: Mutex<Live>,
}

impl<M: ModelLoader, T: TextureLoader> VariantResolver<M, T> {
    /// Creates a resolver over process-wide cache and texture bank, which may
    /// be shared with other resolvers.
    pub fn new(
        line: ProductLine,
        cache: Arc<AssetCache<M>>,
        textures: Arc<TextureBank<T>>,
    ) -> Result<Self> {
        line.validate()?;
        let synthesizer = MaterialSynthesizer::from_product_line(&line)?;
        let environment = Environment::new(line.environment);
        Ok(Self {
            line,
            cache,
            textures,
            synthesizer,
            environment,
            live: Mutex::new(Live {
                latest: 0,
                state: ResolverState::Idle,
                scene: None,
                variant: None,
            }),
        })
    }

    /// Creates a resolver with its own cache and texture bank.
    pub fn with_loaders(line: ProductLine, models: M, textures: T) -> Result<Self> {
        let bank = TextureBank::new(textures, line.texture_bank_config()?);
        Self::new(line, Arc::new(AssetCache::new(models)), Arc::new(bank))
    }

    /// Starts resolving `variant`.
    ///
    /// The sequencing token is taken now, not when the future is first
    /// polled, so call order decides which request wins.
    pub fn resolve(self: &Arc<Self>, variant: VariantId) -> BoxFuture<'static, Result<Resolution>> {
        let token = {
            let mut live = self.live.lock();
            live.latest += 1;
            live.state = ResolverState::Resolving {
                variant,
                token: live.latest,
            };
            live.latest
        };
        debug!("Resolving variant '{variant}' (token {token})");

        let this = Arc::clone(self);
        async move {
            let outcome = this.run(variant, token).await;
            this.finish(variant, token, outcome)
        }
        .boxed()
    }

    async fn run(&self, variant: VariantId, token: u64) -> Result<Resolution> {
        let path = self.line.model_path(variant)?;
        let asset = self.cache.get_or_load(path).await?;
        let textures = if variant.is_translucent() {
            Some(self.textures.ensure_loaded().await?)
        } else {
            None
        };
        self.commit(variant, token, &asset, textures.as_ref())
    }

    fn commit(
        &self,
        variant: VariantId,
        token: u64,
        asset: &AssetHandle,
        textures: Option<&Arc<TextureSet>>,
    ) -> Result<Resolution> {
        let mut live = self.live.lock();
        if token != live.latest {
            return Ok(Resolution::Discarded(StaleResolutionDiscarded {
                variant,
                token,
                latest: live.latest,
            }));
        }

        let (mut next, reused_instance) = match &live.scene {
            Some(current) if current.asset().ptr_eq(asset) => (SceneInstance::clone(current), true),
            _ => (SceneInstance::instantiate(asset, self.environment), false),
        };
        let meshes_updated = next.reassign_materials(&mut |view: MeshView<'_>| {
            self.synthesizer.synthesize(variant, view.authored, textures)
        })?;

        let scene = Arc::new(next);
        live.scene = Some(Arc::clone(&scene));
        live.variant = Some(variant);
        live.state = ResolverState::Idle;
        info!(
            "Applied variant '{variant}' to {meshes_updated} meshes of '{}' (token {token})",
            asset.path()
        );

        Ok(Resolution::Applied(ResolvedScene {
            variant,
            token,
            scene,
            reused_instance,
            meshes_updated,
        }))
    }

    fn finish(
        &self,
        variant: VariantId,
        token: u64,
        outcome: Result<Resolution>,
    ) -> Result<Resolution> {
        match outcome {
            Ok(Resolution::Discarded(stale)) => {
                debug!(
                    "Discarding stale resolution of '{variant}' (token {token}, latest {})",
                    stale.latest
                );
                Ok(Resolution::Discarded(stale))
            }
            Ok(applied) => Ok(applied),
            Err(err) => {
                let mut live = self.live.lock();
                if token == live.latest {
                    live.state = ResolverState::Idle;
                    warn!("Resolution of '{variant}' failed, keeping previous scene: {err}");
                    Err(err)
                } else {
                    debug!("Superseded resolution of '{variant}' failed: {err}");
                    Ok(Resolution::Discarded(StaleResolutionDiscarded {
                        variant,
                        token,
                        latest: live.latest,
                    }))
                }
            }
        }
    }

    pub fn state(&self) -> ResolverState {
        self.live.lock().state
    }

    /// Last published scene, if any resolution has been applied.
    pub fn current_scene(&self) -> Option<Arc<SceneInstance>> {
        self.live.lock().scene.clone()
    }

    /// Variant of the last published scene.
    pub fn current_variant(&self) -> Option<VariantId> {
        self.live.lock().variant
    }

    /// Token of the most recently issued resolution (0 before the first).
    pub fn latest_token(&self) -> u64 {
        self.live.lock().latest
    }

    #[inline]
    pub fn product_line(&self) -> &ProductLine {
        &self.line
    }

    #[inline]
    pub fn cache(&self) -> &Arc<AssetCache<M>> {
        &self.cache
    }

    #[inline]
    pub fn texture_bank(&self) -> &Arc<TextureBank<T>> {
        &self.textures
    }

    #[inline]
    pub fn synthesizer(&self) -> &MaterialSynthesizer {
        &self.synthesizer
    }

    #[inline]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }
}
