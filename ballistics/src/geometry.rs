use bevy_math::Vec3;

use crate::constants::PHYSICS_EPSILON;

// ============================================================================
// Vector Helpers
// ============================================================================

// Reflect a direction about a surface normal: v' = v - 2(v·n)n
#[must_use]
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    let dot = direction.dot(normal);
    direction - 2.0 * dot * normal
}

/// Rotate `v` about the unit `axis` by `angle` radians (Rodrigues' rotation formula).
#[must_use]
pub fn rotate_about_axis(v: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    v * cos + axis.cross(v) * sin + axis * axis.dot(v) * (1.0 - cos)
}

/// Rotate `v` by the rotation that carries unit vector `from` onto unit vector `to`.
#[must_use]
pub fn rotate_from_to(v: Vec3, from: Vec3, to: Vec3) -> Vec3 {
    let cos = from.dot(to).clamp(-1.0, 1.0);
    let axis = from.cross(to);
    let axis_len = axis.length();

    if axis_len < PHYSICS_EPSILON {
        if cos > 0.0 {
            return v;
        }
        // Antiparallel: half turn about any axis perpendicular to `from`
        return rotate_about_axis(v, from.any_orthonormal_vector(), std::f32::consts::PI);
    }

    rotate_about_axis(v, axis / axis_len, cos.acos())
}

// Turn `direction` toward `target` by `angle` radians (in the plane they span).
#[must_use]
pub fn turn_towards(direction: Vec3, target: Vec3, angle: f32) -> Vec3 {
    let axis = direction.cross(target);
    let axis_len = axis.length();
    if axis_len < PHYSICS_EPSILON || angle == 0.0 {
        return direction;
    }
    rotate_about_axis(direction, axis / axis_len, angle).normalize_or_zero()
}

// Component of `direction` lying in the surface plane, normalized (zero for head-on hits).
#[must_use]
pub fn surface_tangent(direction: Vec3, normal: Vec3) -> Vec3 {
    (direction - normal * direction.dot(normal)).normalize_or_zero()
}

// Replace non-finite vectors by zero so NaN never propagates through the stepping loop.
#[must_use]
pub fn finite_or_zero(v: Vec3) -> Vec3 {
    if v.is_finite() { v } else { Vec3::ZERO }
}
