use std::sync::Arc;

use crate::resources::texture::{Texture, TextureChannel};

/// The diffuse / normal / roughness textures of the translucent surface.
///
/// Built once by the texture bank with its wrap, repeat and filtering policy
/// already applied; afterwards only shared behind `Arc`.
#[derive(Debug, PartialEq)]
pub struct TextureSet {
    diffuse: Arc<Texture>,
    normal: Arc<Texture>,
    roughness: Arc<Texture>,
}

impl TextureSet {
    #[must_use]
    pub fn new(diffuse: Texture, normal: Texture, roughness: Texture) -> Self {
        Self {
            diffuse: Arc::new(diffuse),
            normal: Arc::new(normal),
            roughness: Arc::new(roughness),
        }
    }

    #[inline]
    #[must_use]
    pub fn diffuse(&self) -> &Arc<Texture> {
        &self.diffuse
    }

    #[inline]
    #[must_use]
    pub fn normal(&self) -> &Arc<Texture> {
        &self.normal
    }

    #[inline]
    #[must_use]
    pub fn roughness(&self) -> &Arc<Texture> {
        &self.roughness
    }

    #[must_use]
    pub fn get(&self, channel: TextureChannel) -> &Arc<Texture> {
        match channel {
            TextureChannel::Diffuse => &self.diffuse,
            TextureChannel::Normal => &self.normal,
            TextureChannel::Roughness => &self.roughness,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureChannel, &Arc<Texture>)> {
        TextureChannel::ALL
            .into_iter()
            .map(move |channel| (channel, self.get(channel)))
    }
}
