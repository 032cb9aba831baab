//! Live scene instance
//!
//! A [`SceneInstance`] is the renderable copy of a cached [`Prefab`]: its own
//! node graph and its own materials, layered on the template's shared
//! geometry and textures. Materials are only replaced through a
//! [`MeshVisitor`], which either succeeds for every mesh or changes nothing.

use std::sync::Arc;

use glam::Affine3A;
use slotmap::SlotMap;

use crate::assets::handle::AssetHandle;
use crate::assets::prefab::{Prefab, PrefabPrimitive};
use crate::errors::Result;
use crate::resources::geometry::Geometry;
use crate::resources::material::{MaterialSpec, OpaqueSpec};
use crate::scene::environment::Environment;
use crate::scene::node::Node;
use crate::scene::{MeshKey, NodeHandle};

/// One drawable: shared geometry plus the material owned by this instance.
#[derive(Debug, Clone)]
pub struct MeshInstance {
    pub node: NodeHandle,
    pub geometry: Arc<Geometry>,
    pub material: MaterialSpec,
    primitive: PrefabPrimitive,
}

/// Read-only view of a mesh handed to a [`MeshVisitor`].
pub struct MeshView<'a> {
    pub key: MeshKey,
    pub node: &'a Node,
    pub geometry: &'a Arc<Geometry>,
    /// Material currently assigned to the mesh
    pub current: &'a MaterialSpec,
    /// Material from the cached template, never modified
    pub authored: &'a OpaqueSpec,
}

/// Produces the replacement material for each mesh of an instance.
pub trait MeshVisitor {
    fn visit(&mut self, mesh: MeshView<'_>) -> Result<MaterialSpec>;
}

impl<F> MeshVisitor for F
where
    F: FnMut(MeshView<'_>) -> Result<MaterialSpec>,
{
    fn visit(&mut self, mesh: MeshView<'_>) -> Result<MaterialSpec> {
        self(mesh)
    }
}

#[derive(Debug, Clone)]
pub struct SceneInstance {
    asset: AssetHandle,
    nodes: SlotMap<NodeHandle, Node>,
    meshes: SlotMap<MeshKey, MeshInstance>,
    root_nodes: Vec<NodeHandle>,
    pub environment: Environment,
}

impl SceneInstance {
    /// Builds a fresh instance of the template behind `asset`, with every
    /// mesh carrying a copy of its authored material.
    #[must_use]
    pub fn instantiate(asset: &AssetHandle, environment: Environment) -> Self {
        let mut instance = Self {
            asset: asset.clone(),
            nodes: SlotMap::with_key(),
            meshes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            environment,
        };

        let prefab: &Prefab = asset;
        for &root in &prefab.root_indices {
            if let Some(handle) = instance.instantiate_node(prefab, root, None, 0) {
                instance.root_nodes.push(handle);
            }
        }
        instance
    }

    fn instantiate_node(
        &mut self,
        prefab: &Prefab,
        index: usize,
        parent: Option<NodeHandle>,
        depth: usize,
    ) -> Option<NodeHandle> {
        // Guards against cyclic or absurdly deep hierarchies in malformed files.
        if depth > prefab.nodes.len() {
            return None;
        }
        let source = prefab.nodes.get(index)?;

        let mut node = Node::new(source.name.as_deref().unwrap_or_default());
        node.transform = source.transform;
        node.parent = parent;
        let handle = self.nodes.insert(node);

        for primitive in &source.primitives {
            let Some(geometry) = prefab.geometries.get(primitive.geometry) else {
                continue;
            };
            let mesh = MeshInstance {
                node: handle,
                geometry: Arc::clone(geometry),
                material: MaterialSpec::Opaque(prefab.material_for(primitive).clone()),
                primitive: primitive.clone(),
            };
            let key = self.meshes.insert(mesh);
            self.nodes[handle].meshes.push(key);
        }

        for &child in &source.children_indices {
            if let Some(child_handle) = self.instantiate_node(prefab, child, Some(handle), depth + 1) {
                self.nodes[handle].children.push(child_handle);
            }
        }
        Some(handle)
    }

    /// The cached template this instance was built from.
    #[inline]
    #[must_use]
    pub fn asset(&self) -> &AssetHandle {
        &self.asset
    }

    #[inline]
    #[must_use]
    pub fn root_nodes(&self) -> &[NodeHandle] {
        &self.root_nodes
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[must_use]
    pub fn get_mesh(&self, key: MeshKey) -> Option<&MeshInstance> {
        self.meshes.get(key)
    }

    #[must_use]
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .find_map(|(handle, node)| (node.name == name).then_some(handle))
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn iter_meshes(&self) -> impl Iterator<Item = (MeshKey, &MeshInstance)> {
        self.meshes.iter()
    }

    /// Snapshot of every mesh's material, in mesh order.
    #[must_use]
    pub fn materials(&self) -> Vec<MaterialSpec> {
        self.meshes.values().map(|m| m.material.clone()).collect()
    }

    /// Template material a mesh was authored with.
    #[must_use]
    pub fn authored_material(&self, mesh: &MeshInstance) -> &OpaqueSpec {
        self.asset.material_for(&mesh.primitive)
    }

    /// World matrix of a node, composed from the root down.
    #[must_use]
    pub fn world_matrix(&self, handle: NodeHandle) -> Affine3A {
        let mut matrix = Affine3A::IDENTITY;
        let mut current = Some(handle);
        while let Some(h) = current {
            let Some(node) = self.nodes.get(h) else {
                break;
            };
            matrix = node.local_matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// Replaces the material of every mesh with the visitor's output.
    ///
    /// All replacements are staged first; if the visitor fails for any mesh,
    /// the error is returned and no material changes. Returns the number of
    /// meshes updated.
    pub fn reassign_materials(&mut self, visitor: &mut impl MeshVisitor) -> Result<usize> {
        let mut staged = Vec::with_capacity(self.meshes.len());
        for (key, mesh) in &self.meshes {
            let view = MeshView {
                key,
                node: &self.nodes[mesh.node],
                geometry: &mesh.geometry,
                current: &mesh.material,
                authored: self.asset.material_for(&mesh.primitive),
            };
            staged.push((key, visitor.visit(view)?));
        }

        let count = staged.len();
        for (key, material) in staged {
            self.meshes[key].material = material;
        }
        Ok(count)
    }
}
