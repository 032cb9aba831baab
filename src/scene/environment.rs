//! Environment - plain data
//!
//! Lighting and background setup forwarded to the renderer with each scene.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Named lighting rig of a product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentPreset {
    /// Showroom: studio HDRI shown as background, soft key light
    #[default]
    Studio,
    /// AR preview: apartment HDRI for reflections only, stronger key light
    Apartment,
}

impl EnvironmentPreset {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EnvironmentPreset::Studio => "studio",
            EnvironmentPreset::Apartment => "apartment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub intensity: f32,
}

/// Lighting configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub preset: EnvironmentPreset,
    /// Whether the environment map is drawn as background
    pub show_background: bool,
    /// Ambient light intensity
    pub ambient_intensity: f32,
    pub directional: DirectionalLight,
    /// Tone mapping exposure
    pub exposure: f32,
}

impl Environment {
    #[must_use]
    pub fn new(preset: EnvironmentPreset) -> Self {
        match preset {
            EnvironmentPreset::Studio => Self {
                preset,
                show_background: true,
                ambient_intensity: 1.0,
                directional: DirectionalLight {
                    position: Vec3::splat(5.0),
                    intensity: 0.5,
                },
                exposure: 1.0,
            },
            EnvironmentPreset::Apartment => Self {
                preset,
                show_background: false,
                ambient_intensity: 0.8,
                directional: DirectionalLight {
                    position: Vec3::splat(5.0),
                    intensity: 1.0,
                },
                exposure: 1.0,
            },
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(EnvironmentPreset::default())
    }
}

impl From<EnvironmentPreset> for Environment {
    fn from(preset: EnvironmentPreset) -> Self {
        Self::new(preset)
    }
}
