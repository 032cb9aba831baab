use crate::assets::io::AssetReader;
use crate::assets::texture_bank::TextureLoader;
use crate::errors::LoadFailure;
use crate::resources::image::Image;
use crate::resources::texture::{ColorSpace, Texture};

/// Loads standalone image files (PNG / JPEG / WebP) as RGBA8 textures.
pub struct ImageTextureLoader<R: AssetReader> {
    reader: R,
}

impl<R: AssetReader> ImageTextureLoader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    #[inline]
    pub fn reader(&self) -> &R {
        &self.reader
    }
}

impl<R: AssetReader + 'static> TextureLoader for ImageTextureLoader<R> {
    async fn load_texture(
        &self,
        path: &str,
        color_space: ColorSpace,
    ) -> Result<Texture, LoadFailure> {
        let bytes = self.reader.read_bytes(path).await?;
        // Native: offload decoding to a blocking thread
        let image = tokio::task::spawn_blocking(move || decode_image(&bytes, color_space)).await??;
        Ok(Texture::new(path, image))
    }
}

/// CPU image decoding logic.
pub fn decode_image(bytes: &[u8], color_space: ColorSpace) -> Result<Image, LoadFailure> {
    let rgba = image::load_from_memory(bytes)?.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Image::new(
        width,
        height,
        color_space.rgba8_format(),
        rgba.into_raw(),
    ))
}
