mod gltf;
mod image;

pub use self::gltf::GltfModelLoader;
pub use self::image::{ImageTextureLoader, decode_image};
