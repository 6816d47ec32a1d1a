use bevy_math::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    collision::{RayHit, Scene, SurfaceId},
    config::BallisticsConfig,
    constants::PHYSICS_EPSILON,
    geometry::{finite_or_zero, reflect, surface_tangent, turn_towards},
    material::{Material, MaterialId, MaterialRegistry},
    pool::ProjectileHandle,
    projectile::{ProjectileState, kinetic_energy},
    target::{ImpactCommands, ImpactReport},
};

// ============================================================================
// Impact Outcomes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactOutcome {
    Penetrate,
    NonPenetrate,
    Deflect,
    NoImpact,
}

impl ImpactOutcome {
    // Whether the substep loop stops for this tick.
    #[must_use]
    pub const fn ends_tick(self) -> bool {
        matches!(self, Self::NonPenetrate | Self::NoImpact)
    }
}

/// Record of one resolved intersection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactEvent {
    pub handle: ProjectileHandle,
    pub surface: SurfaceId,
    pub entry: Vec3,
    pub exit: Vec3,
    pub thickness: f32,
    pub incident_velocity: Vec3,
    pub velocity: Vec3,
    #[serde(skip)]
    pub target_material: Option<MaterialId>, // None for scenery
    pub deflection_factor: f32,
    pub hp_before: f32,
    pub hp_after: f32,
    pub outcome: ImpactOutcome,
}

// ============================================================================
// Formulas
// ============================================================================

/// Ricochet score; above 1 the projectile deflects.
///
/// `(Ht / Hp) * (IRt / IRp) * (1 / v^2) * (A / m) * tan(theta) * K`
#[must_use]
pub fn deflection_factor(
    target: &Material,
    projectile: &Material,
    speed: f32,
    area_per_mass: f32,
    tan_theta: f32,
    constant: f32,
) -> f32 {
    let hardness_ratio = target.hardness / projectile.hardness;
    let resistance_ratio = target.impact_resistance / projectile.impact_resistance;
    let velocity_factor = 1.0 / (speed * speed);
    let factor = hardness_ratio * resistance_ratio * velocity_factor * area_per_mass * tan_theta * constant;
    // 0 * inf from a head-on hit at zero speed
    if factor.is_nan() { 0.0 } else { factor }
}

#[must_use]
pub fn protection_value(target: &Material, thickness: f32, config: &BallisticsConfig) -> f32 {
    let toughness = target.toughness_coefficient(config.toughness_resistance_factor, config.toughness_multiplier);
    thickness * (target.hardness + toughness) * config.protection_scale
}

// clamp01(protection / hp / divisor)
#[must_use]
pub fn energy_loss_ratio(protection: f32, hp_pool: f32, divisor: f32) -> f32 {
    let ratio = protection / hp_pool / divisor;
    if ratio.is_nan() { 1.0 } else { ratio.clamp(0.0, 1.0) }
}

// Fraction of kinetic energy lost in a ricochet: 1 - exp(-cos(theta) * exponent)
#[must_use]
pub fn ricochet_energy_loss_ratio(cos_theta: f32, exponent: f32) -> f32 {
    (1.0 - (-cos_theta * exponent).exp()).clamp(0.0, 1.0)
}

// Deviation toward the surface plane, interpolated 0 -> max by the deflection factor (radians).
#[must_use]
pub fn diffraction_angle(deflection_factor: f32, max_degrees: f32) -> f32 {
    (max_degrees * deflection_factor.clamp(0.0, 1.0)).to_radians()
}

// cos and tan of the angle between the direction and the surface normal.
fn incidence(direction: Vec3, normal: Vec3) -> (f32, f32) {
    let cos = direction.dot(normal).abs().min(1.0);
    let sin = (1.0 - cos * cos).max(0.0).sqrt();
    (cos, sin / cos)
}

// ============================================================================
// Resolver
// ============================================================================

/// Decides the outcome of an intersection and applies it to the projectile.
pub struct Resolver<'a> {
    pub config: &'a BallisticsConfig,
    pub materials: &'a MaterialRegistry,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub const fn new(config: &'a BallisticsConfig, materials: &'a MaterialRegistry) -> Self {
        Self { config, materials }
    }

    pub fn resolve<S: Scene + ?Sized>(
        &self,
        handle: ProjectileHandle,
        state: &mut ProjectileState,
        hit: &RayHit,
        scene: &mut S,
        commands: &mut ImpactCommands,
    ) -> ImpactEvent {
        let incident_velocity = state.velocity;
        let speed = incident_velocity.length();
        let direction = incident_velocity.normalize_or_zero();
        let hp_before = state.hp_pool;

        let mut event = ImpactEvent {
            handle,
            surface: hit.surface,
            entry: hit.point,
            exit: hit.point,
            thickness: 0.0,
            incident_velocity,
            velocity: incident_velocity,
            target_material: None,
            deflection_factor: 0.0,
            hp_before,
            hp_after: hp_before,
            outcome: ImpactOutcome::NoImpact,
        };

        // Plain scenery: stops the projectile outright, no damage hooks
        let Some((target_id, dampening)) = scene
            .target_mut(hit.surface)
            .map(|target| (self.materials.resolve(target.material()), target.deflection_dampening()))
        else {
            state.position = hit.point;
            state.velocity = Vec3::ZERO;
            state.hp_pool = 0.0;
            event.velocity = Vec3::ZERO;
            event.hp_after = 0.0;
            event.outcome = ImpactOutcome::NonPenetrate;
            debug!(?handle, surface = hit.surface.0, "stopped by scenery");
            return event;
        };
        event.target_material = Some(target_id);

        let target = self.materials.get(target_id);
        let projectile = self.materials.get(state.material);
        let (cos_theta, tan_theta) = incidence(direction, hit.normal);

        let area_per_mass = state.cross_section() / state.mass;
        let factor = deflection_factor(
            target,
            projectile,
            speed,
            area_per_mass,
            tan_theta,
            self.config.deflection_constant,
        ) * dampening;
        let factor = factor.max(0.0);
        event.deflection_factor = factor;

        if factor > 1.0 {
            self.deflect(state, hit, direction, speed, cos_theta, &mut event);
        } else if let Some(exit) = self.penetrate(state, hit, scene, direction, speed, factor, target, &mut event) {
            event.exit = exit;
        }

        event.velocity = state.velocity;
        event.hp_after = state.hp_pool;

        debug!(
            ?handle,
            surface = hit.surface.0,
            outcome = ?event.outcome,
            factor,
            thickness = event.thickness,
            hp = state.hp_pool,
            "impact resolved"
        );

        self.notify(state, scene, &event, commands);
        event
    }

    fn deflect(
        &self,
        state: &mut ProjectileState,
        hit: &RayHit,
        direction: Vec3,
        speed: f32,
        cos_theta: f32,
        event: &mut ImpactEvent,
    ) {
        let new_direction = reflect(direction, hit.normal).normalize_or_zero();
        let loss = ricochet_energy_loss_ratio(cos_theta, self.config.ricochet_loss_exponent);
        let new_speed = speed * (1.0 - loss).sqrt();

        let energy_lost = kinetic_energy(state.mass, speed) - kinetic_energy(state.mass, new_speed);
        state.hp_pool = (state.hp_pool - energy_lost * self.config.hp_per_joule).max(0.0);
        state.velocity = finite_or_zero(new_direction * new_speed);
        state.position = hit.point + new_direction * self.config.resume_offset;
        event.outcome = ImpactOutcome::Deflect;
    }

    // Diffraction, exit search and energy loss. Returns the exit point when one is found.
    fn penetrate<S: Scene + ?Sized>(
        &self,
        state: &mut ProjectileState,
        hit: &RayHit,
        scene: &S,
        direction: Vec3,
        speed: f32,
        factor: f32,
        target: &Material,
        event: &mut ImpactEvent,
    ) -> Option<Vec3> {
        let tangent = surface_tangent(direction, hit.normal);
        // Elevation above the surface plane; diffraction keeps at least half of it
        let elevation = (-direction.dot(hit.normal)).clamp(0.0, 1.0).asin();
        let angle = diffraction_angle(factor, self.config.max_diffraction_degrees).min(elevation * 0.5);
        let turned = if tangent == Vec3::ZERO {
            direction
        } else {
            turn_towards(direction, tangent, angle)
        };
        let new_direction = if turned.dot(hit.normal) < 0.0 { turned } else { direction };

        let Some(exit) = self.find_exit(scene, hit.surface, hit.point, new_direction) else {
            // Treated as a miss: keep going from just past the entry point
            state.position = hit.point + direction * self.config.resume_offset;
            event.outcome = ImpactOutcome::NoImpact;
            return None;
        };

        let thickness = (exit - hit.point).dot(new_direction).max(0.0);
        let protection = protection_value(target, thickness, self.config);
        let ratio = energy_loss_ratio(protection, state.hp_pool, self.config.energy_loss_divisor);

        state.hp_pool = (state.hp_pool - protection).max(0.0);
        event.thickness = thickness;

        if state.hp_pool > 0.0 {
            state.velocity = finite_or_zero(new_direction * speed * (1.0 - ratio).sqrt());
            state.position = exit + new_direction * self.config.resume_offset;
            state.penetrations += 1;
            event.outcome = ImpactOutcome::Penetrate;
        } else {
            state.velocity = Vec3::ZERO;
            state.position = hit.point;
            event.outcome = ImpactOutcome::NonPenetrate;
        }

        Some(exit)
    }

    /// Exponential search for the far side of `surface`: probe points at 0.1, 0.2, 0.4 ... m
    /// along `direction` (capped at the limit), casting back toward the entry point.
    #[must_use]
    pub fn find_exit<S: Scene + ?Sized>(
        &self,
        scene: &S,
        surface: SurfaceId,
        entry: Vec3,
        direction: Vec3,
    ) -> Option<Vec3> {
        if direction.length_squared() < PHYSICS_EPSILON {
            return None;
        }

        let limit = self.config.exit_search_limit;
        let mut distance = self.config.exit_search_start.min(limit);

        loop {
            let probe = entry + direction * distance;
            if let Some(exit) = scene.cast_against(surface, probe, -direction, distance) {
                return Some(exit.point);
            }
            if distance >= limit || distance <= 0.0 {
                return None;
            }
            distance = (distance * 2.0).min(limit);
        }
    }

    fn notify<S: Scene + ?Sized>(
        &self,
        state: &mut ProjectileState,
        scene: &mut S,
        event: &ImpactEvent,
        commands: &mut ImpactCommands,
    ) {
        let (Some(target), Some(material)) = (scene.target_mut(event.surface), event.target_material) else {
            return;
        };

        let report = ImpactReport {
            surface: event.surface,
            material,
            entry: event.entry,
            exit: event.exit,
            thickness: event.thickness,
            velocity: event.velocity,
            incident_velocity: event.incident_velocity,
            diameter: state.diameter,
            kind: state.kind,
        };

        match event.outcome {
            ImpactOutcome::Penetrate => target.on_post_penetration(&report, &mut state.rng, commands),
            ImpactOutcome::NonPenetrate => target.on_non_penetration(&report, &mut state.rng, commands),
            ImpactOutcome::Deflect => target.on_deflection(&report, &mut state.rng, commands),
            ImpactOutcome::NoImpact => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collision::{CuboidWorld, LayerMask, RaycastService},
        material::MaterialCategory,
        projectile::{ProjectileKind, SpawnParams},
        target::ArmorPlate,
    };

    fn steel() -> Material {
        Material::new("HighCarbonSteel", MaterialCategory::Metal, 6.5, 7800.0, 120.0)
    }

    fn shell(materials: &MaterialRegistry, velocity: Vec3) -> ProjectileState {
        let material = materials.lookup("HighCarbonSteel").expect("builtin material");
        let params = SpawnParams {
            position: Vec3::ZERO,
            velocity,
            seed: 42,
            diameter: 0.0762,
            length: 0.355,
            material,
            kind: ProjectileKind::Primary,
        };
        let mut state = ProjectileState::default();
        state.init(&params, materials.get(material), BallisticsConfig::default().hp_per_joule);
        state
    }

    fn plate(thickness: f32) -> (CuboidWorld, SurfaceId) {
        let mut world = CuboidWorld::new();
        let id = world.add_target(
            Vec3::new(0.0, 0.0, 5.0 + thickness / 2.0),
            Vec3::new(3.0, 3.0, thickness / 2.0),
            LayerMask::ARMOR,
            ArmorPlate::new("RolledHomogeneousArmor"),
        );
        (world, id)
    }

    fn handle() -> ProjectileHandle {
        let mut registry = crate::pool::ProjectileRegistry::new(1, 1);
        registry.spawn(|_| {}).expect("spawn")
    }

    #[test]
    fn energy_loss_matches_worked_example() {
        let ratio = energy_loss_ratio(1500.0, 5000.0, 1.3);
        assert!((ratio - 0.2308).abs() < 1e-3);
        assert!(((1.0 - ratio).sqrt() - 0.877).abs() < 1e-3);
    }

    #[test]
    fn energy_loss_is_clamped() {
        assert_eq!(energy_loss_ratio(10_000.0, 5.0, 1.3), 1.0);
        assert_eq!(energy_loss_ratio(0.0, 5.0, 1.3), 0.0);
        assert_eq!(energy_loss_ratio(5.0, 0.0, 1.3), 1.0);
    }

    #[test]
    fn grazing_hit_on_harder_target_deflects() {
        let ceramic = Material::new("SiliconCarbide", MaterialCategory::Ceramic, 9.5, 3210.0, 6.0);
        let (_, tan) = incidence(Vec3::new(1.0, 0.0, 1e-4).normalize(), Vec3::Z);
        let factor = deflection_factor(&ceramic, &steel(), 900.0, 3.6e-4, tan, 6.0e8);
        assert!(factor > 1.0, "factor = {factor}");
    }

    #[test]
    fn head_on_hit_never_deflects() {
        let (cos, tan) = incidence(Vec3::Z, -Vec3::Z);
        assert_eq!(cos, 1.0);
        assert_eq!(deflection_factor(&steel(), &steel(), 500.0, 3.6e-4, tan, 6.0e8), 0.0);
    }

    #[test]
    fn ricochet_loss_grows_with_incidence() {
        let grazing = ricochet_energy_loss_ratio(0.05, 3.0);
        let steep = ricochet_energy_loss_ratio(0.5, 3.0);
        assert!(grazing < steep);
        assert!((0.0..=1.0).contains(&grazing));
    }

    #[test]
    fn diffraction_is_bounded() {
        assert_eq!(diffraction_angle(0.0, 15.0), 0.0);
        assert!((diffraction_angle(1.0, 15.0) - 15f32.to_radians()).abs() < 1e-6);
        assert!((diffraction_angle(7.0, 15.0) - 15f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn thin_plate_is_penetrated() {
        let config = BallisticsConfig::default();
        let materials = MaterialRegistry::builtin();
        let resolver = Resolver::new(&config, &materials);
        let (mut world, id) = plate(0.05);
        let mut state = shell(&materials, Vec3::Z * 792.0);
        let hit = world.cast(Vec3::ZERO, Vec3::Z, 10.0, LayerMask::ALL).expect("hit");

        let mut commands = ImpactCommands::new();
        let event = resolver.resolve(handle(), &mut state, &hit, &mut world, &mut commands);

        assert_eq!(event.outcome, ImpactOutcome::Penetrate);
        assert!((event.thickness - 0.05).abs() < 1e-4);
        assert!(event.hp_after < event.hp_before);
        assert!(state.speed() < 792.0);
        assert!(state.position.z > 5.05);
        assert_eq!(state.penetrations, 1);
        // The plate asked for spall
        assert!(!commands.is_empty());
        assert_eq!(world.target_as::<ArmorPlate>(id).map(|p| p.ledger.penetrations), Some(1));
    }

    #[test]
    fn thick_block_stops_the_shell() {
        let config = BallisticsConfig::default();
        let materials = MaterialRegistry::builtin();
        let resolver = Resolver::new(&config, &materials);
        let (mut world, id) = plate(2.0);
        let mut state = shell(&materials, Vec3::Z * 792.0);
        let hit = world.cast(Vec3::ZERO, Vec3::Z, 10.0, LayerMask::ALL).expect("hit");

        let mut commands = ImpactCommands::new();
        let event = resolver.resolve(handle(), &mut state, &hit, &mut world, &mut commands);

        assert_eq!(event.outcome, ImpactOutcome::NonPenetrate);
        assert_eq!(state.hp_pool, 0.0);
        assert_eq!(state.velocity, Vec3::ZERO);
        assert!(commands.is_empty());
        assert_eq!(world.target_as::<ArmorPlate>(id).map(|p| p.ledger.non_penetrations), Some(1));
    }

    #[test]
    fn grazing_shell_ricochets() {
        let config = BallisticsConfig::default();
        let materials = MaterialRegistry::builtin();
        let resolver = Resolver::new(&config, &materials);
        let (mut world, id) = plate(0.05);
        let direction = Vec3::new(0.0, 0.995, 0.1).normalize();
        let mut state = shell(&materials, direction * 792.0);
        let origin = Vec3::new(0.0, -2.0, 4.8);
        let hit = world.cast(origin, direction, 10.0, LayerMask::ALL).expect("hit");

        let mut commands = ImpactCommands::new();
        let event = resolver.resolve(handle(), &mut state, &hit, &mut world, &mut commands);

        assert!(event.deflection_factor > 1.0);
        assert_eq!(event.outcome, ImpactOutcome::Deflect);
        assert!(state.velocity.z < 0.0, "reflected away from the plate");
        assert!(state.speed() <= 792.0);
        assert!(state.hp_pool <= event.hp_before);
        assert_eq!(world.target_as::<ArmorPlate>(id).map(|p| p.ledger.deflections), Some(1));
    }

    #[test]
    fn scenery_stops_without_hooks() {
        let config = BallisticsConfig::default();
        let materials = MaterialRegistry::builtin();
        let resolver = Resolver::new(&config, &materials);
        let mut world = CuboidWorld::new();
        world.add_scenery(Vec3::new(0.0, 0.0, 5.0), Vec3::splat(0.5), LayerMask::SCENERY);
        let mut state = shell(&materials, Vec3::Z * 792.0);
        let hit = world.cast(Vec3::ZERO, Vec3::Z, 10.0, LayerMask::ALL).expect("hit");

        let mut commands = ImpactCommands::new();
        let event = resolver.resolve(handle(), &mut state, &hit, &mut world, &mut commands);

        assert_eq!(event.outcome, ImpactOutcome::NonPenetrate);
        assert_eq!(event.target_material, None);
        assert_eq!(state.hp_pool, 0.0);
        assert!(commands.is_empty());
    }

    #[test]
    fn zero_thickness_slab_terminates() {
        let config = BallisticsConfig::default();
        let materials = MaterialRegistry::builtin();
        let resolver = Resolver::new(&config, &materials);
        let mut world = CuboidWorld::new();
        let id = world.add_target(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(3.0, 3.0, 0.0),
            LayerMask::ARMOR,
            ArmorPlate::new("RolledHomogeneousArmor"),
        );

        let exit = resolver.find_exit(&world, id, Vec3::new(0.0, 0.0, 5.0), Vec3::Z).expect("exit");
        assert!((exit.z - 5.0).abs() < 1e-5);
    }

    #[test]
    fn near_grazing_penetration_stays_inside_the_plate() {
        let config = BallisticsConfig::default();
        let materials = MaterialRegistry::builtin();
        let resolver = Resolver::new(&config, &materials);
        let tungsten = materials.lookup("Tungsten").expect("builtin material");

        for degrees in [87.0_f32, 88.0, 89.0] {
            let mut world = CuboidWorld::new();
            let id = world.add_target(
                Vec3::new(0.0, 0.0, 5.025),
                Vec3::new(20.0, 20.0, 0.025),
                LayerMask::ARMOR,
                ArmorPlate::new("Wood"),
            );

            let (sin, cos) = degrees.to_radians().sin_cos();
            let direction = Vec3::new(sin, 0.0, cos);
            let params = SpawnParams {
                position: Vec3::new(0.0, 0.0, 5.0) - direction,
                velocity: direction * 1036.0,
                seed: 7,
                diameter: 0.038,
                length: 0.18,
                material: tungsten,
                kind: ProjectileKind::Primary,
            };
            let mut state = ProjectileState::default();
            state.init(&params, materials.get(tungsten), config.hp_per_joule);
            let hit = world.cast(params.position, direction, 10.0, LayerMask::ALL).expect("hit");

            let mut commands = ImpactCommands::new();
            let event = resolver.resolve(handle(), &mut state, &hit, &mut world, &mut commands);
            let ledger = world.target_as::<ArmorPlate>(id).map(|p| p.ledger).expect("plate");

            assert!(event.deflection_factor <= 1.0, "{degrees}: factor = {}", event.deflection_factor);
            if event.outcome == ImpactOutcome::Penetrate {
                assert!(state.velocity.z > 0.0, "{degrees}: left through the entry face");
                assert!(event.thickness > 0.0, "{degrees}: zero thickness");
                assert!(event.exit.z > 5.04, "{degrees}: exit {:?}", event.exit);
                assert_eq!(ledger.penetrations, 1);
            } else {
                assert_eq!(ledger.penetrations, 0);
                assert!(commands.is_empty());
            }
        }
    }

    #[test]
    fn missing_exit_is_no_impact() {
        let config = BallisticsConfig::default();
        let materials = MaterialRegistry::builtin();
        let resolver = Resolver::new(&config, &materials);
        // 30 m deep block: no exit within the 10 m search
        let (mut world, _) = plate(30.0);
        let mut state = shell(&materials, Vec3::Z * 792.0);
        let before = state.clone();
        let hit = world.cast(Vec3::ZERO, Vec3::Z, 10.0, LayerMask::ALL).expect("hit");

        let mut commands = ImpactCommands::new();
        let event = resolver.resolve(handle(), &mut state, &hit, &mut world, &mut commands);

        assert_eq!(event.outcome, ImpactOutcome::NoImpact);
        assert_eq!(state.hp_pool, before.hp_pool);
        assert_eq!(state.velocity, before.velocity);
        assert!(state.position.z > 5.0);
    }
}
