//! Transform component: scale, Euler rotation and translation.

use crate::euler;
use glam::{Mat4, Vec3};

/// A 3D transform with Euler-angle rotation (radians, pitch/yaw/roll in x/y/z).
///
/// Rotations are composed by plain component addition throughout the engine;
/// see [`euler`] for the matrix conventions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: Vec3,
    pub rotate: Vec3,
    pub translate: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotate: Vec3::ZERO,
            translate: Vec3::ZERO,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_translate(translate: Vec3) -> Self {
        Self {
            translate,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_translate_rotate(translate: Vec3, rotate: Vec3) -> Self {
        Self {
            translate,
            rotate,
            ..Default::default()
        }
    }

    /// World matrix: scale, then rotate, then translate.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translate)
            * euler::rotation_matrix(self.rotate)
            * Mat4::from_scale(self.scale)
    }

    /// Direction the transform faces (+Z rotated by pitch and yaw).
    pub fn forward(&self) -> Vec3 {
        euler::forward(self.rotate)
    }

    /// Returns true if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.scale.is_finite() && self.rotate.is_finite() && self.translate.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_matrix_for_default() {
        let m = Transform::default().to_matrix();
        assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn matrix_applies_scale_before_translation() {
        let t = Transform {
            scale: Vec3::splat(2.0),
            rotate: Vec3::ZERO,
            translate: Vec3::new(1.0, 0.0, 0.0),
        };
        let p = t.to_matrix().transform_point3(Vec3::new(1.0, 1.0, 1.0));
        assert!(p.abs_diff_eq(Vec3::new(3.0, 2.0, 2.0), 1e-6));
    }
}
