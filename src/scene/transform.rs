use glam::{Affine3A, Quat, Vec3};

/// Local TRS of a scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Uniform scale with a rotation around +Y given in degrees.
    #[must_use]
    pub fn from_scale_yaw(scale: f32, yaw_degrees: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_y(yaw_degrees.to_radians()),
            scale: Vec3::splat(scale),
        }
    }

    #[must_use]
    pub fn local_matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
