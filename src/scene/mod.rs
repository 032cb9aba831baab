//! Scene graph
//!
//! - Node: hierarchy and transform
//! - Transform: local position, rotation, scale
//! - SceneInstance: renderable copy of a cached model with its own materials
//! - Environment: lighting presets forwarded to the renderer

pub mod environment;
pub mod instance;
pub mod node;
pub mod transform;

pub use environment::{DirectionalLight, Environment, EnvironmentPreset};
pub use instance::{MeshInstance, MeshView, MeshVisitor, SceneInstance};
pub use node::Node;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
}
