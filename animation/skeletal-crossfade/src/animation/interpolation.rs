//! Pose interpolation primitives
//!
//! Positions and scales blend linearly, rotations travel the shorter arc
//! between two unit quaternions. `t` is not clamped here; callers pass a
//! value in `[0, 1]`.

use super::types::Transform;
use crate::error::{AnimationError, Result};
use glam::{Quat, Vec3};

/// Above this cosine the two rotations are treated as parallel
pub const SLERP_LINEAR_THRESHOLD: f32 = 0.9999;

/// Smallest quaternion length accepted by [`normalize_rotation`]
const MIN_ROTATION_LENGTH: f32 = 1e-6;

/// Linear interpolation `a + (b - a) * t`
pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Spherical linear interpolation between unit quaternions
///
/// The second rotation is flipped when the dot product is negative so the
/// result always follows the shorter arc. Nearly parallel inputs fall back
/// to a component-wise linear blend, which is not renormalised.
pub fn slerp(a: Quat, b: Quat, t: f32) -> Quat {
    let mut cos_theta = a.dot(b);
    let sign = if cos_theta < 0.0 {
        cos_theta = -cos_theta;
        -1.0
    } else {
        1.0
    };

    let (scale_a, scale_b) = if cos_theta < SLERP_LINEAR_THRESHOLD {
        let theta = cos_theta.acos();
        let inv_sin = 1.0 / theta.sin();
        (
            ((1.0 - t) * theta).sin() * inv_sin,
            (t * theta).sin() * inv_sin * sign,
        )
    } else {
        (1.0 - t, t * sign)
    };

    Quat::from_xyzw(
        scale_a * a.x + scale_b * b.x,
        scale_a * a.y + scale_b * b.y,
        scale_a * a.z + scale_b * b.z,
        scale_a * a.w + scale_b * b.w,
    )
}

/// Interpolate a whole transform: lerp position and scale, slerp rotation
pub fn interpolate(a: &Transform, b: &Transform, t: f32) -> Transform {
    Transform {
        translation: lerp_vec3(a.translation, b.translation, t),
        rotation: slerp(a.rotation, b.rotation, t),
        scale: lerp_vec3(a.scale, b.scale, t),
    }
}

/// Normalise a source rotation, rejecting zero or non-finite quaternions
pub fn normalize_rotation(rotation: Quat) -> Result<Quat> {
    let length = rotation.length();
    if !length.is_finite() || length < MIN_ROTATION_LENGTH {
        return Err(AnimationError::DegenerateQuaternion(format!(
            "{rotation:?} has length {length}"
        )));
    }
    Ok(rotation / length)
}

/// Position of `value` between `start` and `end` as a fraction
///
/// Fails instead of dividing when `start == end`.
pub fn inverse_lerp(start: f32, end: f32, value: f32) -> Result<f32> {
    let range = end - start;
    if range == 0.0 || !range.is_finite() {
        return Err(AnimationError::ZeroDenominator(format!(
            "interpolation range [{start}, {end}] is empty"
        )));
    }
    Ok((value - start) / range)
}
