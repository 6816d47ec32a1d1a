use bevy_math::Vec3;
use serde::{Deserialize, Serialize};
use std::any::Any;

use crate::{
    collision::SurfaceId,
    material::MaterialId,
    projectile::ProjectileKind,
    rng::ShotRng,
};

// ============================================================================
// Impact Reports
// ============================================================================

// What a target hook is told about an impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactReport {
    pub surface: SurfaceId,
    pub material: MaterialId,
    pub entry: Vec3,
    pub exit: Vec3,
    pub thickness: f32,
    pub velocity: Vec3,          // after the impact
    pub incident_velocity: Vec3, // before the impact
    pub diameter: f32,
    pub kind: ProjectileKind,
}

// A target's request to eject fragments from the exit side of a penetration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpallRequest {
    pub entry: Vec3,
    pub exit: Vec3,
    pub thickness: f32,
    pub incident_velocity: Vec3,
    pub diameter: f32,
    pub material: MaterialId,
    pub seed: u64,
}

/// Work a hook asks the simulation to perform once the current projectile finishes its step.
#[derive(Debug, Default)]
pub struct ImpactCommands {
    spall: Vec<SpallRequest>,
}

impl ImpactCommands {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // The request's seed is drawn from the projectile's stream so replays eject the same pattern.
    pub fn spawn_spall(&mut self, impact: &ImpactReport, rng: &mut ShotRng) {
        self.spall.push(SpallRequest {
            entry: impact.entry,
            exit: impact.exit,
            thickness: impact.thickness,
            incident_velocity: impact.incident_velocity,
            diameter: impact.diameter,
            material: impact.material,
            seed: rng.next_seed(),
        });
    }

    pub fn drain_spall(&mut self) -> std::vec::Drain<'_, SpallRequest> {
        self.spall.drain(..)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spall.is_empty()
    }
}

// ============================================================================
// Target Capability
// ============================================================================

/// Damage capability of a struck surface.
///
/// Every hook defaults to a no-op so a target only implements the reactions it cares about.
#[allow(unused_variables)]
pub trait TargetSurface: Any + Send + Sync {
    // Registry key of the surface material.
    fn material(&self) -> &str;

    // Multiplier applied to the deflection factor (values below 1 make ricochets rarer).
    fn deflection_dampening(&self) -> f32 {
        1.0
    }

    fn on_post_penetration(&mut self, impact: &ImpactReport, rng: &mut ShotRng, commands: &mut ImpactCommands) {}

    fn on_non_penetration(&mut self, impact: &ImpactReport, rng: &mut ShotRng, commands: &mut ImpactCommands) {}

    fn on_deflection(&mut self, impact: &ImpactReport, rng: &mut ShotRng, commands: &mut ImpactCommands) {}
}

// ============================================================================
// Armor Plate
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageLedger {
    pub penetrations: u32,
    pub non_penetrations: u32,
    pub deflections: u32,
    pub spall_events: u32,
}

// A plate that tallies hits and ejects spall when penetrated.
#[derive(Debug, Clone)]
pub struct ArmorPlate {
    pub material: String,
    pub dampening: f32,
    pub spall: bool,
    pub spall_from_fragments: bool,
    pub ledger: DamageLedger,
}

impl ArmorPlate {
    #[must_use]
    pub fn new(material: &str) -> Self {
        Self {
            material: material.to_string(),
            dampening: 1.0,
            spall: true,
            spall_from_fragments: false,
            ledger: DamageLedger::default(),
        }
    }

    #[must_use]
    pub const fn with_dampening(mut self, dampening: f32) -> Self {
        self.dampening = dampening;
        self
    }

    #[must_use]
    pub const fn without_spall(mut self) -> Self {
        self.spall = false;
        self
    }
}

impl TargetSurface for ArmorPlate {
    fn material(&self) -> &str {
        &self.material
    }

    fn deflection_dampening(&self) -> f32 {
        self.dampening
    }

    fn on_post_penetration(&mut self, impact: &ImpactReport, rng: &mut ShotRng, commands: &mut ImpactCommands) {
        self.ledger.penetrations += 1;

        let from_fragment = impact.kind == ProjectileKind::Spall;
        if self.spall && (!from_fragment || self.spall_from_fragments) {
            commands.spawn_spall(impact, rng);
            self.ledger.spall_events += 1;
        }
    }

    fn on_non_penetration(&mut self, _impact: &ImpactReport, _rng: &mut ShotRng, _commands: &mut ImpactCommands) {
        self.ledger.non_penetrations += 1;
    }

    fn on_deflection(&mut self, _impact: &ImpactReport, _rng: &mut ShotRng, _commands: &mut ImpactCommands) {
        self.ledger.deflections += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(kind: ProjectileKind) -> ImpactReport {
        ImpactReport {
            surface: SurfaceId(0),
            material: MaterialId(0),
            entry: Vec3::ZERO,
            exit: Vec3::Z * 0.05,
            thickness: 0.05,
            velocity: Vec3::Z * 500.0,
            incident_velocity: Vec3::Z * 700.0,
            diameter: 0.02,
            kind,
        }
    }

    #[test]
    fn plate_requests_spall_for_primary_hits() {
        let mut plate = ArmorPlate::new("RolledHomogeneousArmor");
        let mut rng = ShotRng::from_seed(3);
        let mut commands = ImpactCommands::new();

        plate.on_post_penetration(&report(ProjectileKind::Primary), &mut rng, &mut commands);

        assert_eq!(plate.ledger.penetrations, 1);
        assert_eq!(plate.ledger.spall_events, 1);
        let requests: Vec<_> = commands.drain_spall().collect();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].thickness, 0.05);
    }

    #[test]
    fn plate_ignores_fragments_by_default() {
        let mut plate = ArmorPlate::new("RolledHomogeneousArmor");
        let mut rng = ShotRng::from_seed(3);
        let mut commands = ImpactCommands::new();

        plate.on_post_penetration(&report(ProjectileKind::Spall), &mut rng, &mut commands);

        assert_eq!(plate.ledger.penetrations, 1);
        assert!(commands.is_empty());
    }

    #[test]
    fn spall_seed_comes_from_projectile_stream() {
        let mut commands = ImpactCommands::new();
        let mut rng = ShotRng::from_seed(11);
        commands.spawn_spall(&report(ProjectileKind::Primary), &mut rng);

        let mut expected = ShotRng::from_seed(11);
        let request = commands.drain_spall().next().expect("one request");
        assert_eq!(request.seed, expected.next_seed());
    }
}
