//! Rigid placement of a mesh in the world.

use glam::{Mat4, Quat, Vec3};

/// Translation, rotation and per-axis scale, applied scale first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Pure translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Returns `self` with the given scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Replaces the rotation with `angle` radians about +Y.
    pub fn set_rotation_y(&mut self, angle: f32) {
        self.rotation = Quat::from_rotation_y(angle);
    }

    /// Object-to-world matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_matrix() {
        assert_eq!(Transform::IDENTITY.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_scale_then_translate() {
        let t = Transform::from_translation(Vec3::new(2.0, 0.0, 0.0))
            .with_scale(Vec3::new(1.0, 100.0, 1.0));
        let p = t.matrix().transform_point3(Vec3::new(0.5, 0.5, 0.5));
        assert!((p - Vec3::new(2.5, 50.0, 0.5)).length() < 1e-4);
    }

    #[test]
    fn test_rotation_y_quarter_turn() {
        let mut t = Transform::IDENTITY;
        t.set_rotation_y(FRAC_PI_2);
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }
}
