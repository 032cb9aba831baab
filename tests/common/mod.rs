//! Shared fixtures for integration tests: counting, gateable, failable fake
//! loaders and resolver builders.
#![allow(dead_code)]

use std::sync::Arc;

use glam::Vec4;
use matchum::assets::{ModelLoader, Prefab, PrefabNode, PrefabPrimitive, TextureLoader};
use matchum::errors::LoadFailure;
use matchum::pipeline::VariantResolver;
use matchum::resources::{ColorSpace, Geometry, OpaqueSpec, Texture, TextureSlot};
use matchum::{AssetCache, ProductLine, TextureBank};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::Notify;

/// Bookkeeping shared by both fake loaders.
#[derive(Default)]
pub struct Probe {
    calls: Mutex<FxHashMap<String, usize>>,
    failing: Mutex<FxHashSet<String>>,
    gates: Mutex<FxHashMap<String, Arc<Notify>>>,
}

impl Probe {
    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().get(path).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    pub fn fail(&self, path: &str) {
        self.failing.lock().insert(path.to_string());
    }

    pub fn heal(&self, path: &str) {
        self.failing.lock().remove(path);
    }

    /// Makes loads of `path` wait until the returned gate is notified.
    pub fn gate(&self, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().insert(path.to_string(), Arc::clone(&gate));
        gate
    }

    async fn enter(&self, path: &str) -> Result<(), LoadFailure> {
        *self.calls.lock().entry(path.to_string()).or_default() += 1;
        let gate = self.gates.lock().get(path).cloned();
        match gate {
            Some(gate) => gate.notified().await,
            None => tokio::task::yield_now().await,
        }
        if self.failing.lock().contains(path) {
            return Err(LoadFailure::Http { status: 404 });
        }
        Ok(())
    }
}

/// Builds a two-node cabinet whose only material is named after `path`.
#[derive(Default)]
pub struct FakeModelLoader {
    pub probe: Probe,
}

impl ModelLoader for FakeModelLoader {
    async fn load_model(&self, path: &str) -> Result<Prefab, LoadFailure> {
        self.probe.enter(path).await?;
        Ok(cabinet_prefab(path))
    }
}

#[derive(Default)]
pub struct FakeTextureLoader {
    pub probe: Probe,
}

impl TextureLoader for FakeTextureLoader {
    async fn load_texture(
        &self,
        path: &str,
        color_space: ColorSpace,
    ) -> Result<Texture, LoadFailure> {
        self.probe.enter(path).await?;
        Ok(Texture::solid(path, [200, 190, 170, 255], color_space))
    }
}

pub fn cabinet_prefab(path: &str) -> Prefab {
    let mut prefab = Prefab::new();
    prefab.geometries.push(Arc::new(
        Geometry::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
            .with_indices(vec![0, 1, 2]),
    ));

    let grain = Arc::new(Texture::solid("grain", [180, 140, 100, 255], ColorSpace::Srgb));
    let mut authored = OpaqueSpec::new(path, Vec4::new(0.7, 0.5, 0.3, 1.0));
    authored.map = Some(TextureSlot::new(Arc::clone(&grain)));
    prefab.materials.push(authored);
    prefab.textures.push(grain);

    let mut body = PrefabNode::new("body");
    body.children_indices = vec![1];
    body.primitives.push(PrefabPrimitive {
        geometry: 0,
        material: Some(0),
    });
    let mut door = PrefabNode::new("door");
    door.primitives.push(PrefabPrimitive {
        geometry: 0,
        material: Some(0),
    });
    prefab.nodes = vec![body, door];
    prefab.root_indices = vec![0];
    prefab
}

pub type TestResolver = VariantResolver<Arc<FakeModelLoader>, Arc<FakeTextureLoader>>;

pub struct Harness {
    pub resolver: Arc<TestResolver>,
    pub models: Arc<FakeModelLoader>,
    pub textures: Arc<FakeTextureLoader>,
}

pub fn harness(line: ProductLine) -> Harness {
    let models = Arc::new(FakeModelLoader::default());
    let textures = Arc::new(FakeTextureLoader::default());
    let bank = TextureBank::new(
        Arc::clone(&textures),
        line.texture_bank_config().unwrap(),
    );
    let resolver = VariantResolver::new(
        line,
        Arc::new(AssetCache::new(Arc::clone(&models))),
        Arc::new(bank),
    )
    .unwrap();
    Harness {
        resolver: Arc::new(resolver),
        models,
        textures,
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
