//! Error Types
//!
//! This module defines the error types used throughout the pipeline.
//!
//! # Overview
//!
//! The main error type [`Error`] covers every failure a variant switch can
//! surface:
//! - Model (geometry) fetch or parse failures
//! - Surface-detail texture failures (any of the three channels)
//! - Translucent synthesis without a ready texture set
//! - Product-line configuration problems
//!
//! [`LoadFailure`] carries the underlying I/O or decode reason and is wrapped
//! by the load-related variants.
//!
//! Both types are `Clone`: concurrent callers joined on the same in-flight
//! load all observe the same outcome.
//!
//! # Usage
//!
//! ```rust,ignore
//! use matchum::errors::{Error, Result};
//!
//! fn switch_variant() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use thiserror::Error;

use crate::pipeline::variant::VariantId;
use crate::resources::texture::TextureChannel;

/// Underlying reason a byte fetch or decode failed.
#[derive(Error, Debug, Clone)]
pub enum LoadFailure {
    // ========================================================================
    // I/O & Network
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),

    /// HTTP response error with status code.
    #[error("HTTP response error: status {status}")]
    Http {
        /// HTTP status code
        status: u16,
    },

    /// Transport-level network error.
    #[error("Network error: {0}")]
    Network(String),

    // ========================================================================
    // Format & Parsing
    // ========================================================================
    /// Image or payload decoding error.
    #[error("Decode error: {0}")]
    Decode(String),

    /// glTF parsing or validation error.
    #[error("glTF error: {0}")]
    Gltf(String),

    // ========================================================================
    // Async & Platform
    // ========================================================================
    /// A blocking decode task failed to complete.
    #[error("Task join error: {0}")]
    Task(String),

    /// Feature not enabled.
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(String),
}

impl From<std::io::Error> for LoadFailure {
    fn from(err: std::io::Error) -> Self {
        LoadFailure::Io(Arc::new(err))
    }
}

impl From<image::ImageError> for LoadFailure {
    fn from(err: image::ImageError) -> Self {
        LoadFailure::Decode(err.to_string())
    }
}

impl From<gltf::Error> for LoadFailure {
    fn from(err: gltf::Error) -> Self {
        LoadFailure::Gltf(err.to_string())
    }
}

impl From<tokio::task::JoinError> for LoadFailure {
    fn from(err: tokio::task::JoinError) -> Self {
        LoadFailure::Task(err.to_string())
    }
}

/// The main error type of the variant pipeline.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Geometry fetch or parse failed. The asset cache holds no entry for
    /// `path` afterwards, so a later request retries the load.
    #[error("Failed to load asset '{path}': {source}")]
    AssetLoad {
        /// Logical asset path
        path: String,
        /// Underlying reason
        source: LoadFailure,
    },

    /// One of the surface-detail texture channels failed to load. The whole
    /// texture set is discarded.
    #[error("Failed to load {channel} texture '{path}': {source}")]
    TextureLoad {
        /// Channel that failed
        channel: TextureChannel,
        /// Logical texture path
        path: String,
        /// Underlying reason
        source: LoadFailure,
    },

    /// Translucent synthesis was requested without a ready texture set.
    #[error("Variant '{variant}' requires a loaded texture set")]
    MaterialDependency {
        /// Variant that was being synthesized
        variant: VariantId,
    },

    /// The variant is not part of the configured product line.
    #[error("Variant '{variant}' is not offered by product line '{product_line}'")]
    UnknownVariant {
        /// Requested variant
        variant: VariantId,
        /// Name of the active product line
        product_line: String,
    },

    /// Invalid product-line or preset configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(format!("JSON parse error: {err}"))
    }
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
