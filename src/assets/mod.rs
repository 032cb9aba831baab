pub mod cache;
pub mod handle;
pub mod io;
pub mod loaders;
pub mod prefab;
pub mod storage;
pub mod texture_bank;

// Re-export the asset layer's public surface
pub use cache::{AssetCache, CacheStats, ModelLoader};
pub use handle::{AssetHandle, WeakAssetHandle};
pub use io::{AssetReader, AssetReaderVariant, FileAssetReader};
#[cfg(feature = "http")]
pub use io::HttpAssetReader;
pub use loaders::{GltfModelLoader, ImageTextureLoader};
pub use prefab::{Prefab, PrefabNode, PrefabPrimitive};
pub use storage::{AssetStorage, Fetch};
pub use texture_bank::{TextureBank, TextureBankConfig, TextureLoader};
