//! Core resource definitions, independent of any GPU backend:
//! - Image: decoded pixel data
//! - Texture: image plus sampler and UV transform
//! - TextureSet: the shared diffuse / normal / roughness maps
//! - Geometry: vertex data shared between template and instances
//! - Material: opaque and translucent surface descriptions

pub mod geometry;
pub mod image;
pub mod material;
pub mod texture;
pub mod texture_set;

pub use geometry::{BoundingBox, Geometry};
pub use image::Image;
pub use material::{
    Clearcoat, MaterialSettings, MaterialSpec, OpaqueSpec, Sheen, Side, TranslucentPreset,
    TranslucentSpec,
};
pub use texture::{
    ColorSpace, MAX_ANISOTROPY, Texture, TextureChannel, TextureSampler, TextureSlot,
    TextureTransform,
};
pub use texture_set::TextureSet;
