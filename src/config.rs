//! Product-line configuration.
//!
//! A [`ProductLine`] is the data that differs between deployments of the
//! viewer: which variants exist and which model each one uses, where the
//! surface-detail textures live, the translucent preset table, the lighting
//! rig and the viewer's default transform. Lines are plain JSON documents
//! (see [`ProductLine::from_json_str`]); two are built in.

use std::path::Path;

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::assets::texture_bank::TextureBankConfig;
use crate::errors::{Error, Result};
use crate::pipeline::variant::VariantId;
use crate::resources::material::TranslucentPreset;
use crate::resources::texture::MAX_ANISOTROPY;
use crate::scene::environment::EnvironmentPreset;

/// One selectable variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantEntry {
    pub id: VariantId,
    /// Display name shown by the UI
    pub label: String,
    /// Logical path of the model asset
    pub model: String,
    /// UI swatch color, `#RRGGBB`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swatch: Option<String>,
    /// Base color multiplier applied to opaque materials, `#RRGGBB`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint: Option<String>,
}

/// Surface-detail texture locations and filtering quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TexturePaths {
    pub diffuse: String,
    pub normal: String,
    pub roughness: String,
    #[serde(default = "default_anisotropy")]
    pub anisotropy: u16,
}

fn default_anisotropy() -> u16 {
    MAX_ANISOTROPY
}

impl Default for TexturePaths {
    fn default() -> Self {
        Self {
            diffuse: "/textures/hanji/diffuse.jpg".to_string(),
            normal: "/textures/hanji/normal.jpg".to_string(),
            roughness: "/textures/hanji/roughness.jpg".to_string(),
            anisotropy: MAX_ANISOTROPY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerDefaults {
    pub scale: f32,
    pub rotation_degrees: f32,
    pub auto_rotate: bool,
    /// Yaw change of one rotate-button press
    pub rotation_step_degrees: f32,
    /// Range the UI scale slider spans
    pub scale_range: [f32; 2],
    /// Orbit auto-rotate speed forwarded to the camera controller
    pub auto_rotate_speed: f32,
}

impl Default for ViewerDefaults {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_degrees: 0.0,
            auto_rotate: false,
            rotation_step_degrees: 45.0,
            scale_range: [0.1, 10.0],
            auto_rotate_speed: 2.0,
        }
    }
}

fn default_presets() -> Vec<TranslucentPreset> {
    TranslucentPreset::builtin()
}

fn default_preset_name() -> String {
    "hanji".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLine {
    pub name: String,
    pub variants: Vec<VariantEntry>,
    #[serde(default)]
    pub textures: TexturePaths,
    #[serde(default = "default_presets")]
    pub presets: Vec<TranslucentPreset>,
    /// Name of the preset used for translucent variants
    #[serde(default = "default_preset_name")]
    pub preset: String,
    #[serde(default)]
    pub environment: EnvironmentPreset,
    #[serde(default)]
    pub viewer: ViewerDefaults,
}

impl ProductLine {
    /// Full showroom: one model per variant, paper-resin translucent variant.
    #[must_use]
    pub fn showroom() -> Self {
        let entry = |id: VariantId, label: &str, swatch: &str| VariantEntry {
            id,
            label: label.to_string(),
            model: format!("/models/Matchum_cabinet({id}).glb"),
            swatch: Some(swatch.to_string()),
            tint: None,
        };
        Self {
            name: "showroom".to_string(),
            variants: vec![
                entry(VariantId::Wood, "원목", "#C19A6B"),
                entry(VariantId::Resin, "레진", "#2C5F7D"),
                entry(VariantId::Metal, "메탈", "#A8A8A8"),
            ],
            textures: TexturePaths::default(),
            presets: TranslucentPreset::builtin(),
            preset: default_preset_name(),
            environment: EnvironmentPreset::Studio,
            viewer: ViewerDefaults {
                scale: 1.5,
                scale_range: [0.5, 3.0],
                ..ViewerDefaults::default()
            },
        }
    }

    /// AR preview line: one shared model, variants differ only by tint.
    #[must_use]
    pub fn simplified() -> Self {
        let entry = |id: VariantId, label: &str, color: &str| VariantEntry {
            id,
            label: label.to_string(),
            model: "/models/test_cabinet.glb".to_string(),
            swatch: Some(color.to_string()),
            tint: Some(color.to_string()),
        };
        Self {
            name: "simplified".to_string(),
            variants: vec![
                entry(VariantId::Natural, "오크", "#D4A574"),
                entry(VariantId::Walnut, "월넛", "#5C4033"),
                entry(VariantId::White, "화이트", "#F5F5F0"),
            ],
            textures: TexturePaths::default(),
            presets: TranslucentPreset::builtin(),
            preset: default_preset_name(),
            environment: EnvironmentPreset::Apartment,
            viewer: ViewerDefaults {
                scale: 0.01,
                scale_range: [0.005, 0.03],
                ..ViewerDefaults::default()
            },
        }
    }

    /// Parses and validates a product line.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let line: ProductLine = serde_json::from_str(json)?;
        line.validate()?;
        Ok(line)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.variants.is_empty() {
            return Err(Error::Config(format!(
                "product line '{}' offers no variants",
                self.name
            )));
        }

        let mut seen = FxHashSet::default();
        for entry in &self.variants {
            if !seen.insert(entry.id) {
                return Err(Error::Config(format!("variant '{}' listed twice", entry.id)));
            }
            if entry.model.trim().is_empty() {
                return Err(Error::Config(format!(
                    "variant '{}' has an empty model path",
                    entry.id
                )));
            }
            for color in [&entry.swatch, &entry.tint].into_iter().flatten() {
                parse_hex_color(color)?;
            }
        }

        for preset in &self.presets {
            preset.validate()?;
        }
        if self.variants.iter().any(|v| v.id.is_translucent()) {
            self.texture_bank_config()?.validate()?;
        } else if !(1..=MAX_ANISOTROPY).contains(&self.textures.anisotropy) {
            return Err(Error::Config(format!(
                "anisotropy {} outside 1..={MAX_ANISOTROPY}",
                self.textures.anisotropy
            )));
        }
        self.selected_preset()?;

        let [min, max] = self.viewer.scale_range;
        if !(min > 0.0 && min <= max && (min..=max).contains(&self.viewer.scale)) {
            return Err(Error::Config(format!(
                "default scale {} outside scale range {min}..={max}",
                self.viewer.scale
            )));
        }
        let step = self.viewer.rotation_step_degrees;
        if !(step.is_finite() && step > 0.0) {
            return Err(Error::Config(format!(
                "rotation step {step} must be finite and positive"
            )));
        }
        if !self.viewer.rotation_degrees.is_finite() {
            return Err(Error::Config(format!(
                "default rotation {} must be finite",
                self.viewer.rotation_degrees
            )));
        }
        Ok(())
    }

    /// Entry for `variant`, or `UnknownVariant` if the line doesn't offer it.
    pub fn variant(&self, variant: VariantId) -> Result<&VariantEntry> {
        self.variants
            .iter()
            .find(|entry| entry.id == variant)
            .ok_or_else(|| Error::UnknownVariant {
                variant,
                product_line: self.name.clone(),
            })
    }

    pub fn model_path(&self, variant: VariantId) -> Result<&str> {
        self.variant(variant).map(|entry| entry.model.as_str())
    }

    pub fn variant_ids(&self) -> impl Iterator<Item = VariantId> + '_ {
        self.variants.iter().map(|entry| entry.id)
    }

    /// First listed variant, shown when the viewer mounts.
    pub fn default_variant(&self) -> Result<VariantId> {
        self.variants
            .first()
            .map(|entry| entry.id)
            .ok_or_else(|| Error::Config(format!("product line '{}' offers no variants", self.name)))
    }

    pub fn selected_preset(&self) -> Result<&TranslucentPreset> {
        self.presets
            .iter()
            .find(|p| p.name == self.preset)
            .ok_or_else(|| Error::Config(format!("unknown translucent preset '{}'", self.preset)))
    }

    /// Texture bank settings: paths and anisotropy from the line, repeat
    /// factor from the selected preset.
    pub fn texture_bank_config(&self) -> Result<TextureBankConfig> {
        let preset = self.selected_preset()?;
        Ok(TextureBankConfig {
            diffuse: self.textures.diffuse.clone(),
            normal: self.textures.normal.clone(),
            roughness: self.textures.roughness.clone(),
            repeat: preset.repeat,
            anisotropy: self.textures.anisotropy,
        })
    }

    /// Linear-space tints keyed by variant.
    pub fn tints(&self) -> Result<FxHashMap<VariantId, Vec3>> {
        self.variants
            .iter()
            .filter_map(|entry| entry.tint.as_ref().map(|hex| (entry.id, hex)))
            .map(|(id, hex)| Ok((id, parse_hex_color(hex)?)))
            .collect()
    }
}

/// Parses `#RRGGBB` (sRGB) into a linear-space color.
pub fn parse_hex_color(hex: &str) -> Result<Vec3> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::Config(format!("invalid color '{hex}', expected #RRGGBB")));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map(|v| srgb_to_linear(f32::from(v) / 255.0))
            .map_err(|_| Error::Config(format!("invalid color '{hex}', expected #RRGGBB")))
    };
    Ok(Vec3::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
