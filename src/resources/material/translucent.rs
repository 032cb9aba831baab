use std::ops::RangeInclusive;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::resources::texture_set::TextureSet;

pub const OPACITY_RANGE: RangeInclusive<f32> = 0.85..=0.95;
pub const TRANSMISSION_RANGE: RangeInclusive<f32> = 0.1..=0.25;
pub const THICKNESS_RANGE: RangeInclusive<f32> = 0.3..=0.8;
pub const IOR_RANGE: RangeInclusive<f32> = 1.45..=1.5;
pub const CLEARCOAT_RANGE: RangeInclusive<f32> = 0.15..=0.3;

/// Fiber scattering approximation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sheen {
    pub color: Vec3,
    pub roughness: f32,
}

/// Lacquer layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clearcoat {
    pub factor: f32,
    pub roughness: f32,
}

/// Physically based paper-resin surface.
///
/// The three surface-detail maps come from `textures`, which is the single
/// texture set shared by every translucent material in the process.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslucentSpec {
    /// Name of the preset this spec was built from
    pub preset: String,
    pub color: Vec3,
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    pub transmission: f32,
    pub thickness: f32,
    pub ior: f32,
    pub clearcoat: Clearcoat,
    pub sheen: Sheen,
    pub normal_scale: Vec2,
    pub textures: Arc<TextureSet>,
}

/// Named table entry of translucent design constants.
///
/// Presets are data: the synthesizer copies the selected entry verbatim, it
/// never derives values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslucentPreset {
    pub name: String,
    pub color: [f32; 3],
    pub roughness: f32,
    #[serde(default)]
    pub metalness: f32,
    pub opacity: f32,
    pub transmission: f32,
    pub thickness: f32,
    pub ior: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub sheen_color: [f32; 3],
    pub sheen_roughness: f32,
    #[serde(default = "default_normal_scale")]
    pub normal_scale: f32,
    /// UV repeat applied to the surface-detail textures
    pub repeat: [f32; 2],
}

fn default_normal_scale() -> f32 {
    1.0
}

impl TranslucentPreset {
    /// Warm beige hand-made paper, coarse 2x2 tiling.
    #[must_use]
    pub fn hanji() -> Self {
        Self {
            name: "hanji".to_string(),
            color: [0.93, 0.89, 0.80],
            roughness: 0.65,
            metalness: 0.0,
            opacity: 0.92,
            transmission: 0.15,
            thickness: 0.5,
            ior: 1.5,
            clearcoat: 0.2,
            clearcoat_roughness: 0.35,
            sheen_color: [1.0, 0.96, 0.88],
            sheen_roughness: 0.8,
            normal_scale: 0.6,
            repeat: [2.0, 2.0],
        }
    }

    /// Thinner blue-grey paper, fine 3x3 tiling with a stronger lacquer.
    #[must_use]
    pub fn hanji_fine() -> Self {
        Self {
            name: "hanji_fine".to_string(),
            color: [0.76, 0.80, 0.84],
            roughness: 0.6,
            metalness: 0.0,
            opacity: 0.88,
            transmission: 0.22,
            thickness: 0.35,
            ior: 1.45,
            clearcoat: 0.28,
            clearcoat_roughness: 0.3,
            sheen_color: [0.90, 0.93, 0.96],
            sheen_roughness: 0.7,
            normal_scale: 0.5,
            repeat: [3.0, 3.0],
        }
    }

    #[must_use]
    pub fn builtin() -> Vec<Self> {
        vec![Self::hanji(), Self::hanji_fine()]
    }

    /// Checks every term against the paper-resin design ranges.
    pub fn validate(&self) -> Result<()> {
        let checks: [(&str, f32, &RangeInclusive<f32>); 5] = [
            ("opacity", self.opacity, &OPACITY_RANGE),
            ("transmission", self.transmission, &TRANSMISSION_RANGE),
            ("thickness", self.thickness, &THICKNESS_RANGE),
            ("ior", self.ior, &IOR_RANGE),
            ("clearcoat", self.clearcoat, &CLEARCOAT_RANGE),
        ];
        for (field, value, range) in checks {
            if !range.contains(&value) {
                return Err(Error::Config(format!(
                    "preset '{}': {field} {value} outside {}..={}",
                    self.name,
                    range.start(),
                    range.end()
                )));
            }
        }

        let unit_terms = [
            ("roughness", self.roughness),
            ("metalness", self.metalness),
            ("clearcoat_roughness", self.clearcoat_roughness),
            ("sheen_roughness", self.sheen_roughness),
        ];
        for (field, value) in unit_terms {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "preset '{}': {field} {value} outside 0..=1",
                    self.name
                )));
            }
        }

        if self.color.iter().chain(&self.sheen_color).any(|c| !(0.0..=1.0).contains(c)) {
            return Err(Error::Config(format!(
                "preset '{}': color components must lie in 0..=1",
                self.name
            )));
        }

        if self.repeat.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            return Err(Error::Config(format!(
                "preset '{}': repeat factors must be positive",
                self.name
            )));
        }
        Ok(())
    }

    /// Instantiates the preset over the shared texture set.
    #[must_use]
    pub fn build(&self, textures: Arc<TextureSet>) -> TranslucentSpec {
        TranslucentSpec {
            preset: self.name.clone(),
            color: Vec3::from_array(self.color),
            roughness: self.roughness,
            metalness: self.metalness,
            opacity: self.opacity,
            transmission: self.transmission,
            thickness: self.thickness,
            ior: self.ior,
            clearcoat: Clearcoat {
                factor: self.clearcoat,
                roughness: self.clearcoat_roughness,
            },
            sheen: Sheen {
                color: Vec3::from_array(self.sheen_color),
                roughness: self.sheen_roughness,
            },
            normal_scale: Vec2::splat(self.normal_scale),
            textures,
        }
    }
}
