use std::fmt;
use std::sync::Arc;

use glam::{Mat3, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wgpu::{AddressMode, FilterMode, MipmapFilterMode, TextureFormat};

use crate::resources::image::Image;

/// Highest anisotropic filtering level a sampler may request.
pub const MAX_ANISOTROPY: u16 = 16;

// ============================================================================
// Color space & channels
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Srgb,
    Linear,
}

impl ColorSpace {
    #[must_use]
    pub fn rgba8_format(self) -> TextureFormat {
        match self {
            ColorSpace::Srgb => TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => TextureFormat::Rgba8Unorm,
        }
    }
}

/// Semantic channel of the surface-detail texture set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureChannel {
    Diffuse,
    Normal,
    Roughness,
}

impl TextureChannel {
    pub const ALL: [TextureChannel; 3] = [
        TextureChannel::Diffuse,
        TextureChannel::Normal,
        TextureChannel::Roughness,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TextureChannel::Diffuse => "diffuse",
            TextureChannel::Normal => "normal",
            TextureChannel::Roughness => "roughness",
        }
    }

    /// Only the diffuse channel carries color; normal and roughness are data.
    #[must_use]
    pub fn color_space(self) -> ColorSpace {
        match self {
            TextureChannel::Diffuse => ColorSpace::Srgb,
            TextureChannel::Normal | TextureChannel::Roughness => ColorSpace::Linear,
        }
    }
}

impl fmt::Display for TextureChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Sampler & UV transform
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSampler {
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    pub mipmap_filter: MipmapFilterMode,
    /// Anisotropic filtering level (1 = off)
    pub anisotropy_clamp: u16,
}

impl Default for TextureSampler {
    fn default() -> Self {
        Self {
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: MipmapFilterMode::Linear,
            anisotropy_clamp: 1,
        }
    }
}

impl TextureSampler {
    /// Tiling sampler: repeat wrap on both axes, trilinear filtering and the
    /// given anisotropy (clamped to `1..=MAX_ANISOTROPY`).
    #[must_use]
    pub fn repeating(anisotropy: u16) -> Self {
        Self::default().with_anisotropy(anisotropy)
    }

    /// Returns a copy with the anisotropy level replaced.
    ///
    /// Anisotropic sampling requires linear filtering on every axis, so the
    /// filters are promoted when anisotropy is enabled.
    #[must_use]
    pub fn with_anisotropy(mut self, anisotropy: u16) -> Self {
        self.anisotropy_clamp = anisotropy.clamp(1, MAX_ANISOTROPY);
        if self.anisotropy_clamp > 1 {
            self.mag_filter = FilterMode::Linear;
            self.min_filter = FilterMode::Linear;
            self.mipmap_filter = MipmapFilterMode::Linear;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureTransform {
    pub offset: Vec2,
    pub repeat: Vec2,
    pub rotation: f32,
    pub center: Vec2,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            repeat: Vec2::ONE,
            rotation: 0.0,
            center: Vec2::new(0.5, 0.5),
        }
    }
}

impl TextureTransform {
    /// 3x3 UV transform matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat3 {
        let c = self.rotation.cos();
        let s = self.rotation.sin();
        let Vec2 { x: ox, y: oy } = self.offset;
        let Vec2 { x: rx, y: ry } = self.repeat;
        let Vec2 { x: cx, y: cy } = self.center;

        Mat3::from_cols_array(&[
            c * rx,
            s * rx,
            0.0,
            -s * ry,
            c * ry,
            0.0,
            (c * -cx + s * -cy + cx) * rx + ox,
            (-s * -cx + c * -cy + cy) * ry + oy,
            1.0,
        ])
    }
}

// ============================================================================
// Texture Asset
// ============================================================================

#[derive(Debug, Clone)]
pub struct Texture {
    pub uuid: Uuid,
    pub name: String,
    pub image: Image,
    pub sampler: TextureSampler,
    pub transform: TextureTransform,
    pub generate_mipmaps: bool,
}

impl Texture {
    #[must_use]
    pub fn new(name: &str, image: Image) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            image,
            sampler: TextureSampler::default(),
            transform: TextureTransform::default(),
            generate_mipmaps: false,
        }
    }

    /// 1x1 texture of a single color.
    #[must_use]
    pub fn solid(name: &str, color: [u8; 4], color_space: ColorSpace) -> Self {
        Self::new(name, Image::solid(color, color_space.rgba8_format()))
    }

    #[must_use]
    pub fn mip_level_count(&self) -> u32 {
        if self.generate_mipmaps {
            32 - self.image.width().max(self.image.height()).max(1).leading_zeros()
        } else {
            1
        }
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

/// A material's reference to a shared texture.
///
/// Sampler adjustments made for one material live in `sampler_override`, so
/// the shared [`Texture`] is never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSlot {
    pub texture: Arc<Texture>,
    pub sampler_override: Option<TextureSampler>,
    /// UV set index
    pub channel: u8,
}

impl TextureSlot {
    #[must_use]
    pub fn new(texture: Arc<Texture>) -> Self {
        Self {
            texture,
            sampler_override: None,
            channel: 0,
        }
    }

    /// Sampler the renderer should bind for this slot.
    #[must_use]
    pub fn sampler(&self) -> TextureSampler {
        self.sampler_override.unwrap_or(self.texture.sampler)
    }

    #[must_use]
    pub fn shares_texture(&self, other: &TextureSlot) -> bool {
        Arc::ptr_eq(&self.texture, &other.texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anisotropy_is_clamped() {
        assert_eq!(TextureSampler::repeating(64).anisotropy_clamp, MAX_ANISOTROPY);
        assert_eq!(TextureSampler::repeating(0).anisotropy_clamp, 1);
    }

    #[test]
    fn anisotropy_promotes_filters() {
        let nearest = TextureSampler {
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            mipmap_filter: MipmapFilterMode::Nearest,
            ..Default::default()
        };
        let promoted = nearest.with_anisotropy(8);
        assert_eq!(promoted.min_filter, FilterMode::Linear);
        assert_eq!(promoted.mipmap_filter, MipmapFilterMode::Linear);

        let untouched = nearest.with_anisotropy(1);
        assert_eq!(untouched.min_filter, FilterMode::Nearest);
    }

    #[test]
    fn repeat_scales_uv_matrix() {
        let transform = TextureTransform {
            repeat: Vec2::new(3.0, 3.0),
            ..Default::default()
        };
        let m = transform.matrix();
        let uv = m * glam::Vec3::new(1.0, 1.0, 1.0);
        assert!((uv.x - 3.0).abs() < 1e-5);
        assert!((uv.y - 3.0).abs() < 1e-5);
    }

    #[test]
    fn slot_override_leaves_texture_sampler() {
        let texture = Arc::new(Texture::solid("white", [255; 4], ColorSpace::Srgb));
        let mut slot = TextureSlot::new(Arc::clone(&texture));
        slot.sampler_override = Some(texture.sampler.with_anisotropy(MAX_ANISOTROPY));

        assert_eq!(slot.sampler().anisotropy_clamp, MAX_ANISOTROPY);
        assert_eq!(texture.sampler.anisotropy_clamp, 1);
    }

    #[test]
    fn mip_count_follows_largest_dimension() {
        let mut texture = Texture::new(
            "t",
            Image::new(256, 64, TextureFormat::Rgba8Unorm, vec![0; 256 * 64 * 4]),
        );
        assert_eq!(texture.mip_level_count(), 1);
        texture.generate_mipmaps = true;
        assert_eq!(texture.mip_level_count(), 9);
    }
}
