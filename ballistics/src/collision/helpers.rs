use bevy_math::Vec3;

use crate::constants::PHYSICS_EPSILON;

/// Result of a ray test against a solid: entry distance and outward surface normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub normal: Vec3,
    pub t: f32,
}

/// Ray vs axis-aligned cuboid.
///
/// `direction` must be unit length; `t` is the distance along it, within `[0, max_distance]`.
/// A ray that starts inside (or exactly on the surface of) the cuboid and moves inward does not
/// hit it: callers step out of a solid by casting from inside.
#[must_use]
pub fn ray_vs_cuboid(origin: Vec3, direction: Vec3, max_distance: f32, center: Vec3, half: Vec3) -> Option<Collision> {
    let local = origin - center;

    let mut t_enter = 0.0_f32;
    let mut t_exit = max_distance;
    let mut hit_normal = Vec3::ZERO;

    for axis in 0..3 {
        let dir = direction[axis];
        let pos = local[axis];
        let extent = half[axis];

        if dir.abs() < PHYSICS_EPSILON {
            if pos.abs() > extent {
                return None;
            }
            continue;
        }

        let t1 = (-extent - pos) / dir;
        let t2 = (extent - pos) / dir;
        let (t_near, t_far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };

        if t_near > t_enter {
            t_enter = t_near;
            let mut normal = Vec3::ZERO;
            normal[axis] = if dir > 0.0 { -1.0 } else { 1.0 };
            hit_normal = normal;
        }
        t_exit = t_exit.min(t_far);

        if t_enter > t_exit {
            return None;
        }
    }

    // No face crossed ahead of the origin: either inside the box or entirely behind it
    if hit_normal == Vec3::ZERO || t_exit < 0.0 || t_enter > max_distance {
        return None;
    }

    Some(Collision {
        normal: hit_normal,
        t: t_enter.clamp(0.0, max_distance),
    })
}
