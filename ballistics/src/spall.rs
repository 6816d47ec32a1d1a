use bevy_math::Vec3;
use std::f32::consts::TAU;

use crate::{
    config::SpallConfig,
    constants::PHYSICS_EPSILON,
    geometry::rotate_from_to,
    projectile::{ProjectileKind, SpawnParams},
    rng::ShotRng,
    target::SpallRequest,
};

// ============================================================================
// Fragment Count & Cone
// ============================================================================

/// `clamp(floor(thickness * diameter * density), 0, max)`; non-positive or non-finite input gives 0.
#[must_use]
pub fn fragment_count(thickness: f32, diameter: f32, config: &SpallConfig) -> usize {
    if !(thickness > 0.0 && diameter > 0.0) {
        return 0;
    }
    let base = (thickness * diameter * config.density_constant).floor();
    if !base.is_finite() || base <= 0.0 {
        return 0;
    }
    // Saturating float-to-int cast, then the configured cap
    (base as usize).min(config.max_fragments)
}

// Half-angle of the ejection cone (radians): k * (radius / thickness)^a * (reference / speed)^b
#[must_use]
pub fn cone_angle(radius: f32, thickness: f32, speed: f32, config: &SpallConfig) -> f32 {
    let max = config.max_cone_degrees.to_radians();
    let shape = (radius / thickness).powf(config.cone_a);
    let velocity = (config.reference_velocity / speed).powf(config.cone_b);
    let angle = config.cone_k * shape * velocity;
    if angle.is_nan() { max } else { angle.clamp(0.0, max) }
}

// ============================================================================
// Fragment Synthesis
// ============================================================================

/// Spawn parameters for every fragment of one spall event.
///
/// All draws come from a single generator seeded with the request's seed, so a request always
/// yields the same fragments. Fragments start `resume_offset` past the exit point.
#[must_use]
pub fn generate_fragments(request: &SpallRequest, config: &SpallConfig, resume_offset: f32) -> Vec<SpawnParams> {
    let count = fragment_count(request.thickness, request.diameter, config);
    if count == 0 {
        return Vec::new();
    }

    let speed = request.incident_velocity.length();
    let axis = penetration_axis(request);
    let cone = cone_angle(request.diameter * 0.5, request.thickness, speed, config);
    let origin = request.exit + axis * resume_offset;

    let mean_size = config.size_ratio * request.diameter;
    let mut rng = ShotRng::from_seed(request.seed);
    let mut fragments = Vec::with_capacity(count);

    for _ in 0..count {
        let size = rng
            .normal(mean_size, config.size_deviation * mean_size)
            .max(config.min_fragment_size);
        let fragment_speed = config
            .speed_ratio
            .mul_add(speed, rng.normal(0.0, config.speed_deviation * speed))
            .max(0.0);

        // Elevation biased toward the axis, uniform azimuth
        let elevation = cone * rng.uniform().powi(2);
        let azimuth = TAU * rng.uniform();
        let local = Vec3::new(
            elevation.sin() * azimuth.cos(),
            elevation.sin() * azimuth.sin(),
            elevation.cos(),
        );
        let direction = rotate_from_to(local, Vec3::Z, axis);

        fragments.push(SpawnParams {
            position: origin,
            velocity: direction * fragment_speed,
            seed: rng.next_seed(),
            diameter: size,
            length: size,
            material: request.material,
            kind: ProjectileKind::Spall,
        });
    }

    fragments
}

// Entry-to-exit direction, or the incident direction when the plate has no depth.
fn penetration_axis(request: &SpallRequest) -> Vec3 {
    let through = request.exit - request.entry;
    if request.thickness > PHYSICS_EPSILON && through.length_squared() > PHYSICS_EPSILON * PHYSICS_EPSILON {
        through.normalize()
    } else {
        let incident = request.incident_velocity.normalize_or_zero();
        if incident == Vec3::ZERO { Vec3::Z } else { incident }
    }
}
