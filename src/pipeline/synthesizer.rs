use std::sync::Arc;

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::config::ProductLine;
use crate::errors::{Error, Result};
use crate::pipeline::variant::{SurfaceKind, VariantId};
use crate::resources::material::{MaterialSpec, OpaqueSpec, TranslucentPreset};
use crate::resources::texture::MAX_ANISOTROPY;
use crate::resources::texture_set::TextureSet;

/// Produces the material a mesh should carry under a variant.
///
/// Output depends only on the variant, the mesh's authored material and the
/// shared texture set: no state is carried from one call to the next.
#[derive(Debug, Clone)]
pub struct MaterialSynthesizer {
    preset: TranslucentPreset,
    tints: FxHashMap<VariantId, Vec3>,
}

impl MaterialSynthesizer {
    #[must_use]
    pub fn new(preset: TranslucentPreset, tints: FxHashMap<VariantId, Vec3>) -> Self {
        Self { preset, tints }
    }

    pub fn from_product_line(line: &ProductLine) -> Result<Self> {
        Ok(Self::new(line.selected_preset()?.clone(), line.tints()?))
    }

    #[inline]
    #[must_use]
    pub fn preset(&self) -> &TranslucentPreset {
        &self.preset
    }

    #[must_use]
    pub fn tint(&self, variant: VariantId) -> Option<Vec3> {
        self.tints.get(&variant).copied()
    }

    pub fn synthesize(
        &self,
        variant: VariantId,
        authored: &OpaqueSpec,
        textures: Option<&Arc<TextureSet>>,
    ) -> Result<MaterialSpec> {
        match variant.surface() {
            SurfaceKind::Opaque => Ok(MaterialSpec::Opaque(self.opaque(variant, authored))),
            SurfaceKind::Translucent => {
                let textures = textures.ok_or(Error::MaterialDependency { variant })?;
                Ok(MaterialSpec::Translucent(self.preset.build(Arc::clone(textures))))
            }
        }
    }

    /// Authored surface with sharper base-color filtering and the variant tint.
    fn opaque(&self, variant: VariantId, authored: &OpaqueSpec) -> OpaqueSpec {
        let mut spec = authored.clone();
        if let Some(map) = spec.map.as_mut() {
            map.sampler_override = Some(map.sampler().with_anisotropy(MAX_ANISOTROPY));
        }
        if let Some(tint) = self.tint(variant) {
            spec.color = tint.extend(spec.color.w);
        }
        spec
    }
}
