//! Variant pipeline
//!
//! Viewer state change → [`VariantResolver`] (model path, cached template) →
//! [`MaterialSynthesizer`] (per-mesh materials over the shared texture set) →
//! published [`SceneInstance`](crate::scene::SceneInstance).

pub mod resolver;
pub mod synthesizer;
pub mod variant;
pub mod viewer;

pub use resolver::{
    Resolution, ResolvedScene, ResolverState, StaleResolutionDiscarded, VariantResolver,
};
pub use synthesizer::MaterialSynthesizer;
pub use variant::{SurfaceKind, VariantId};
pub use viewer::{RotateDirection, Viewer, ViewerState};
