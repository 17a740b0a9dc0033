//! Common types for the skeletal animation system

use glam::{Mat4, Quat, Vec3};
use std::ops::Mul;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Scale-rotate-translate transform of a bone
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (no offset, no rotation, unit scale)
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a new transform
    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Transform with unit scale, the shape every source pose arrives in
    pub const fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self::new(translation, rotation, Vec3::ONE)
    }

    pub const fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY, Vec3::ONE)
    }

    /// Re-express `self` inside the frame of `outer`
    ///
    /// The position is rotated and scaled by `outer` and then offset by its
    /// translation, rotations multiply as `outer * self` and scales multiply
    /// component-wise. `child.compose(&parent)` yields the child's transform
    /// in the parent's space.
    pub fn compose(&self, outer: &Self) -> Self {
        Self {
            translation: (outer.rotation * self.translation) * outer.scale + outer.translation,
            rotation: outer.rotation * self.rotation,
            scale: self.scale * outer.scale,
        }
    }

    /// 4x4 matrix applying scale, then rotation, then translation
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Check whether two transforms match within `epsilon` on every component
    pub fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.translation.abs_diff_eq(other.translation, epsilon)
            && self.rotation.abs_diff_eq(other.rotation, epsilon)
            && self.scale.abs_diff_eq(other.scale, epsilon)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// `a * b` is `a.compose(&b)`: `a` expressed first, then moved into `b`
impl Mul for Transform {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(&rhs)
    }
}

/// Trait for types that can be linearly interpolated
pub trait Lerp: Clone {
    /// Linear interpolation between self and other
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Transform {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        super::interpolation::interpolate(self, other, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::interpolation::interpolate;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_compose() {
        let t = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(0.3),
            Vec3::splat(2.0),
        );

        assert!(t.compose(&Transform::IDENTITY).abs_diff_eq(&t, 1e-6));
        assert!(Transform::IDENTITY.compose(&t).abs_diff_eq(&t, 1e-6));
    }

    #[test]
    fn test_compose_rotates_then_translates() {
        let child = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let parent = Transform::from_translation_rotation(
            Vec3::new(0.0, 0.0, 5.0),
            Quat::from_rotation_z(FRAC_PI_2),
        );

        let world = child * parent;

        // +X rotated 90 degrees around Z lands on +Y
        assert!((world.translation.x - 0.0).abs() < 0.001);
        assert!((world.translation.y - 1.0).abs() < 0.001);
        assert!((world.translation.z - 5.0).abs() < 0.001);
        assert!(world.rotation.abs_diff_eq(parent.rotation, 1e-6));
    }

    #[test]
    fn test_compose_scales_position_and_scale() {
        let child = Transform::new(Vec3::new(1.0, 1.0, 0.0), Quat::IDENTITY, Vec3::splat(3.0));
        let parent = Transform::new(Vec3::ZERO, Quat::IDENTITY, Vec3::new(2.0, 4.0, 1.0));

        let world = child.compose(&parent);
        assert_eq!(world.translation, Vec3::new(2.0, 4.0, 0.0));
        assert_eq!(world.scale, Vec3::new(6.0, 12.0, 3.0));
    }

    #[test]
    fn test_compose_rotation_order() {
        let child = Transform::from_translation_rotation(Vec3::ZERO, Quat::from_rotation_x(0.5));
        let parent = Transform::from_translation_rotation(Vec3::ZERO, Quat::from_rotation_y(0.7));

        let world = child.compose(&parent);
        let expected = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(0.5);
        assert!(world.rotation.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_matrix_matches_composition() {
        let child = Transform::new(
            Vec3::new(0.5, -1.0, 2.0),
            Quat::from_rotation_x(0.4),
            Vec3::ONE,
        );
        let parent = Transform::new(
            Vec3::new(3.0, 0.0, 1.0),
            Quat::from_rotation_z(1.1),
            Vec3::splat(2.0),
        );

        let composed = child.compose(&parent).to_matrix();
        let product = parent.to_matrix() * child.to_matrix();
        assert!(composed.abs_diff_eq(product, 1e-5));
    }

    #[test]
    fn test_f32_lerp() {
        assert_eq!(0.0_f32.lerp(&10.0, 0.25), 2.5);
        assert_eq!(4.0_f32.lerp(&8.0, 1.0), 8.0);
    }

    #[test]
    fn test_transform_lerp_matches_interpolate() {
        let a = Transform::from_translation_rotation(Vec3::ZERO, Quat::from_rotation_y(0.2));
        let b = Transform::new(
            Vec3::new(4.0, -2.0, 1.0),
            Quat::from_rotation_y(1.4),
            Vec3::splat(3.0),
        );

        for t in [0.0, 0.3, 0.5, 1.0] {
            let expected = interpolate(&a, &b, t);
            assert_eq!(a.lerp(&b, t), expected);
        }

        let mid = a.lerp(&b, 0.5);
        assert!(mid.translation.abs_diff_eq(Vec3::new(2.0, -1.0, 0.5), 1e-6));
        assert!(mid.rotation.abs_diff_eq(Quat::from_rotation_y(0.8), 1e-5));
    }
}
