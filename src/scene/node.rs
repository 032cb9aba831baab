use glam::Affine3A;

use crate::scene::transform::Transform;
use crate::scene::{MeshKey, NodeHandle};

/// A minimal scene node: hierarchy, transform and the meshes it carries.
///
/// Mesh data lives in the instance's mesh map; nodes only hold keys.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub name: String,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
    pub(crate) meshes: Vec<MeshKey>,
    pub transform: Transform,
    /// Visibility flag for culling
    pub visible: bool,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            visible: true,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn meshes(&self) -> &[MeshKey] {
        &self.meshes
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Affine3A {
        self.transform.local_matrix()
    }
}
