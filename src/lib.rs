#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Variant resolution and material pipeline for a configurable cabinet viewer.
//!
//! The crate turns a variant selection into a ready-to-render scene:
//! - [`assets`]: model cache and texture bank with single-flight loading
//! - [`pipeline`]: variant table, material synthesis, last-request-wins
//!   resolution and the viewer state holder
//! - [`scene`]: per-viewer instances layered on shared cached data
//! - [`config`]: product-line definitions (built-in or JSON)

pub mod assets;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod resources;
pub mod scene;

pub use assets::{
    AssetCache, AssetHandle, AssetReaderVariant, FileAssetReader, GltfModelLoader,
    ImageTextureLoader, ModelLoader, TextureBank, TextureLoader,
};
pub use config::ProductLine;
pub use errors::{Error, LoadFailure, Result};
pub use pipeline::{
    MaterialSynthesizer, Resolution, ResolverState, VariantId, VariantResolver, Viewer,
};
pub use resources::{MaterialSpec, OpaqueSpec, TextureSet, TranslucentSpec};
pub use scene::{Environment, EnvironmentPreset, SceneInstance};
