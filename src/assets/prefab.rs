use std::sync::Arc;

use crate::resources::geometry::Geometry;
use crate::resources::material::OpaqueSpec;
use crate::resources::texture::Texture;
use crate::scene::transform::Transform;

/// One drawable piece of a prefab node.
#[derive(Debug, Clone)]
pub struct PrefabPrimitive {
    /// Index into `Prefab::geometries`
    pub geometry: usize,
    /// Index into `Prefab::materials`; `None` uses the default material
    pub material: Option<usize>,
}

/// Prefab node: data only, children referenced by index.
#[derive(Debug, Clone, Default)]
pub struct PrefabNode {
    pub name: Option<String>,
    pub transform: Transform,
    /// Indices of child nodes in `Prefab::nodes`
    pub children_indices: Vec<usize>,
    pub primitives: Vec<PrefabPrimitive>,
}

impl PrefabNode {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }
}

/// Immutable template parsed from a model file.
///
/// Cached prefabs are shared by every scene instance built from them:
/// instances copy the node structure and authored materials and keep
/// geometry and textures behind `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Prefab {
    /// All nodes, flattened
    pub nodes: Vec<PrefabNode>,
    /// Indices of root nodes in `nodes`
    pub root_indices: Vec<usize>,
    pub geometries: Vec<Arc<Geometry>>,
    /// Authored materials
    pub materials: Vec<OpaqueSpec>,
    pub textures: Vec<Arc<Texture>>,
    /// Material for primitives that reference none
    pub default_material: OpaqueSpec,
}

impl Prefab {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Authored material of a primitive.
    #[must_use]
    pub fn material_for(&self, primitive: &PrefabPrimitive) -> &OpaqueSpec {
        primitive
            .material
            .and_then(|index| self.materials.get(index))
            .unwrap_or(&self.default_material)
    }

    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.nodes.iter().map(|n| n.primitives.len()).sum()
    }
}
