use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use glam::Affine3A;
use log::debug;

use crate::assets::cache::ModelLoader;
use crate::assets::texture_bank::TextureLoader;
use crate::config::ViewerDefaults;
use crate::errors::Result;
use crate::pipeline::resolver::{Resolution, VariantResolver};
use crate::pipeline::variant::VariantId;
use crate::scene::instance::SceneInstance;
use crate::scene::transform::Transform;

/// What the UI currently shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerState {
    pub variant: VariantId,
    /// Uniform model scale
    pub scale: f32,
    /// Yaw around +Y, in degrees
    pub rotation_degrees: f32,
    pub auto_rotate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateDirection {
    Left,
    Right,
}

impl RotateDirection {
    fn sign(self) -> f32 {
        match self {
            RotateDirection::Left => -1.0,
            RotateDirection::Right => 1.0,
        }
    }
}

/// Viewer state holder.
///
/// Only variant changes reach the resolver; scale, rotation and auto-rotate
/// are transform parameters for the renderer.
pub struct Viewer<M: ModelLoader, T: TextureLoader> {
    state: ViewerState,
    defaults: ViewerDefaults,
    resolver: Arc<VariantResolver<M, T>>,
}

impl<M: ModelLoader, T: TextureLoader> Viewer<M, T> {
    /// Mounts a viewer showing the product line's first variant with the
    /// line's default transform. Nothing is resolved until [`Viewer::refresh`]
    /// or [`Viewer::set_variant`] is called.
    pub fn new(resolver: Arc<VariantResolver<M, T>>) -> Result<Self> {
        let line = resolver.product_line();
        let defaults = line.viewer;
        let state = ViewerState {
            variant: line.default_variant()?,
            scale: defaults.scale,
            rotation_degrees: defaults.rotation_degrees,
            auto_rotate: defaults.auto_rotate,
        };
        Ok(Self {
            state,
            defaults,
            resolver,
        })
    }

    #[inline]
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    #[inline]
    pub fn defaults(&self) -> &ViewerDefaults {
        &self.defaults
    }

    #[inline]
    pub fn resolver(&self) -> &Arc<VariantResolver<M, T>> {
        &self.resolver
    }

    /// Selects `variant` and issues exactly one resolution for it.
    ///
    /// A variant the product line doesn't offer is rejected up front: the
    /// state keeps the previous variant and no resolution is issued.
    pub fn set_variant(&mut self, variant: VariantId) -> BoxFuture<'static, Result<Resolution>> {
        if let Err(err) = self.resolver.product_line().variant(variant) {
            return futures::future::ready(Err(err)).boxed();
        }
        debug!("Viewer variant: {} -> {variant}", self.state.variant);
        self.state.variant = variant;
        self.resolver.resolve(variant)
    }

    /// Resolves the current variant again: initial load, or a retry after a
    /// failure.
    pub fn refresh(&self) -> BoxFuture<'static, Result<Resolution>> {
        self.resolver.resolve(self.state.variant)
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.state.scale = scale;
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.state.rotation_degrees = degrees;
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.state.auto_rotate = enabled;
    }

    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.state.auto_rotate = !self.state.auto_rotate;
        self.state.auto_rotate
    }

    /// One press of a rotate button, wrapping into `0..360`.
    pub fn rotate_step(&mut self, direction: RotateDirection) {
        let step = self.defaults.rotation_step_degrees * direction.sign();
        self.state.rotation_degrees = (self.state.rotation_degrees + step).rem_euclid(360.0);
    }

    /// Restores the default transform; the variant is kept.
    pub fn reset(&mut self) {
        self.state.scale = self.defaults.scale;
        self.state.rotation_degrees = self.defaults.rotation_degrees;
        self.state.auto_rotate = self.defaults.auto_rotate;
    }

    /// Model matrix the renderer applies to the scene root.
    pub fn transform(&self) -> Affine3A {
        Transform::from_scale_yaw(self.state.scale, self.state.rotation_degrees).local_matrix()
    }

    pub fn current_scene(&self) -> Option<Arc<SceneInstance>> {
        self.resolver.current_scene()
    }
}
