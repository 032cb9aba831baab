//! Material descriptions produced by the synthesizer.
//!
//! A [`MaterialSpec`] is a closed sum over the two surface families the
//! viewer renders:
//! - [`OpaqueSpec`]: authored PBR metal/roughness surfaces (wood, metal, tints)
//! - [`TranslucentSpec`]: the paper-resin surface with transmission, sheen
//!   and clearcoat terms over the shared surface-detail [`TextureSet`]
//!
//! Materials are plain values. Each scene instance owns its own copies while
//! geometry and textures stay shared behind `Arc`.

mod opaque;
mod translucent;

pub use opaque::OpaqueSpec;
pub use translucent::{
    CLEARCOAT_RANGE, Clearcoat, IOR_RANGE, OPACITY_RANGE, Sheen, THICKNESS_RANGE,
    TRANSMISSION_RANGE, TranslucentPreset, TranslucentSpec,
};

use std::sync::Arc;

use crate::resources::texture_set::TextureSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Pipeline-affecting state of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialSettings {
    pub transparent: bool,
    pub depth_write: bool,
    pub depth_test: bool,
    pub side: Side,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            transparent: false,
            depth_write: true,
            depth_test: true,
            side: Side::Front,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialSpec {
    Opaque(OpaqueSpec),
    Translucent(TranslucentSpec),
}

impl MaterialSpec {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            MaterialSpec::Opaque(m) => &m.name,
            MaterialSpec::Translucent(m) => &m.preset,
        }
    }

    /// Shader family the renderer should select.
    #[must_use]
    pub fn shader_name(&self) -> &'static str {
        match self {
            MaterialSpec::Opaque(_) => "mesh_standard",
            MaterialSpec::Translucent(_) => "mesh_physical",
        }
    }

    #[must_use]
    pub fn settings(&self) -> MaterialSettings {
        match self {
            MaterialSpec::Opaque(m) => MaterialSettings {
                side: m.side,
                ..MaterialSettings::default()
            },
            MaterialSpec::Translucent(_) => MaterialSettings {
                transparent: true,
                depth_write: false,
                depth_test: true,
                side: Side::Double,
            },
        }
    }

    #[must_use]
    pub fn is_translucent(&self) -> bool {
        matches!(self, MaterialSpec::Translucent(_))
    }

    #[must_use]
    pub fn as_opaque(&self) -> Option<&OpaqueSpec> {
        match self {
            MaterialSpec::Opaque(m) => Some(m),
            MaterialSpec::Translucent(_) => None,
        }
    }

    #[must_use]
    pub fn as_translucent(&self) -> Option<&TranslucentSpec> {
        match self {
            MaterialSpec::Translucent(m) => Some(m),
            MaterialSpec::Opaque(_) => None,
        }
    }

    /// Texture set referenced by a translucent material.
    #[must_use]
    pub fn texture_set(&self) -> Option<&Arc<TextureSet>> {
        self.as_translucent().map(|m| &m.textures)
    }
}

impl From<OpaqueSpec> for MaterialSpec {
    fn from(spec: OpaqueSpec) -> Self {
        MaterialSpec::Opaque(spec)
    }
}

impl From<TranslucentSpec> for MaterialSpec {
    fn from(spec: TranslucentSpec) -> Self {
        MaterialSpec::Translucent(spec)
    }
}
