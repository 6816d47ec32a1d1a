use bevy_math::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_4;

use crate::{
    material::{Material, MaterialId},
    pool::Recycle,
    rng::ShotRng,
    trail::TrailVisual,
};

// ============================================================================
// Projectile Kind
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileKind {
    #[default]
    Primary,
    Spall,
}

// ============================================================================
// Derived Quantities
// ============================================================================

// Volume of a cylinder of diameter d and length l (meters): (pi/4) * d^2 * l
#[must_use]
pub fn cylinder_volume(diameter: f32, length: f32) -> f32 {
    FRAC_PI_4 * diameter * diameter * length
}

#[must_use]
pub fn projectile_mass(diameter: f32, length: f32, density: f32) -> f32 {
    cylinder_volume(diameter, length) * density
}

#[must_use]
pub fn cross_section_area(diameter: f32) -> f32 {
    FRAC_PI_4 * diameter * diameter
}

#[must_use]
pub fn kinetic_energy(mass: f32, speed: f32) -> f32 {
    0.5 * mass * speed * speed
}

// ============================================================================
// Projectile State
// ============================================================================

/// Parameters for the low-level spawn path. Dimensions in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnParams {
    pub position: Vec3,
    pub velocity: Vec3,
    pub seed: u64,
    pub diameter: f32,
    pub length: f32,
    pub material: MaterialId,
    pub kind: ProjectileKind,
}

/// Mutable per-shot data advanced by the simulator.
#[derive(Debug, Clone)]
pub struct ProjectileState {
    pub position: Vec3,
    pub previous_position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
    pub diameter: f32,
    pub length: f32,
    pub material: MaterialId,
    pub hp_pool: f32,
    pub penetrations: u32,
    pub frames_alive: u32,
    pub rng: ShotRng,
    pub kind: ProjectileKind,
    pub trail: Option<TrailVisual>,
}

impl ProjectileState {
    // (Re)initialize a pooled state from spawn parameters; the hp pool is the muzzle energy.
    pub fn init(&mut self, params: &SpawnParams, material: &Material, hp_per_joule: f32) {
        let mass = projectile_mass(params.diameter, params.length, material.density);

        self.position = params.position;
        self.previous_position = params.position;
        self.velocity = params.velocity;
        self.mass = mass;
        self.diameter = params.diameter;
        self.length = params.length;
        self.material = params.material;
        self.hp_pool = kinetic_energy(mass, params.velocity.length()) * hp_per_joule;
        self.penetrations = 0;
        self.frames_alive = 0;
        self.rng = ShotRng::from_seed(params.seed);
        self.kind = params.kind;
    }

    #[must_use]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.velocity.normalize_or_zero()
    }

    #[must_use]
    pub fn cross_section(&self) -> f32 {
        cross_section_area(self.diameter)
    }

    #[must_use]
    pub fn kinetic_energy(&self) -> f32 {
        kinetic_energy(self.mass, self.speed())
    }

    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.hp_pool <= 0.0
    }
}

impl Default for ProjectileState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            previous_position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            mass: 0.0,
            diameter: 0.0,
            length: 0.0,
            material: MaterialId(0),
            hp_pool: 0.0,
            penetrations: 0,
            frames_alive: 0,
            rng: ShotRng::default(),
            kind: ProjectileKind::Primary,
            trail: None,
        }
    }
}

impl Recycle for ProjectileState {
    fn recycle(&mut self) {
        *self = Self::default();
    }
}
