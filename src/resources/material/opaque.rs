use glam::{Vec3, Vec4};

use crate::resources::material::Side;
use crate::resources::texture::TextureSlot;

/// Metal/roughness surface as authored in the model file.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueSpec {
    pub name: String,
    /// Base color factor (linear RGBA)
    pub color: Vec4,
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: Vec3,
    /// Base color map
    pub map: Option<TextureSlot>,
    pub normal_map: Option<TextureSlot>,
    /// Metallic-roughness map (G = roughness, B = metalness)
    pub roughness_map: Option<TextureSlot>,
    pub side: Side,
}

impl OpaqueSpec {
    #[must_use]
    pub fn new(name: &str, color: Vec4) -> Self {
        Self {
            name: name.to_string(),
            color,
            ..Default::default()
        }
    }
}

/// glTF default material: white, fully metallic, fully rough.
impl Default for OpaqueSpec {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            color: Vec4::ONE,
            roughness: 1.0,
            metalness: 1.0,
            emissive: Vec3::ZERO,
            map: None,
            normal_map: None,
            roughness_map: None,
            side: Side::Front,
        }
    }
}
