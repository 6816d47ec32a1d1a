use anyhow::{Context, Result};
use bevy_math::Vec3;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{path::Path, time::Duration};

use crate::{
    collision::LayerMask,
    constants::*,
    definition::DefinitionTable,
    material::MaterialTable,
};

// ============================================================================
// Engine Configuration
// ============================================================================

/// Tuned constants and resource limits. Missing fields in a config file keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallisticsConfig {
    pub tick_seconds: f32,
    pub gravity: Vec3,
    pub max_lifetime_ticks: u32,
    pub layer_mask: LayerMask,

    pub max_resolve_attempts: u32,
    pub resume_offset: f32,
    pub exit_search_start: f32,
    pub exit_search_limit: f32,

    pub deflection_constant: f32,
    pub max_diffraction_degrees: f32,
    pub protection_scale: f32,
    pub toughness_resistance_factor: f32,
    pub toughness_multiplier: f32,
    pub energy_loss_divisor: f32,
    pub ricochet_loss_exponent: f32,
    pub hp_per_joule: f32,

    pub spall: SpallConfig,

    pub max_live_projectiles: usize,
    pub projectile_pool_capacity: usize,
    pub trail_pool_capacity: usize,
    pub trail_display_seconds: f32,
}

impl BallisticsConfig {
    #[must_use]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f32(self.tick_seconds)
    }
}

impl Default for BallisticsConfig {
    fn default() -> Self {
        Self {
            tick_seconds: TICK_SECONDS,
            gravity: Vec3::new(0.0, -GRAVITY, 0.0),
            max_lifetime_ticks: MAX_LIFETIME_TICKS,
            layer_mask: LayerMask::ALL,

            max_resolve_attempts: MAX_RESOLVE_ATTEMPTS,
            resume_offset: RESUME_OFFSET,
            exit_search_start: EXIT_SEARCH_START,
            exit_search_limit: EXIT_SEARCH_LIMIT,

            deflection_constant: DEFLECTION_CONSTANT,
            max_diffraction_degrees: MAX_DIFFRACTION_DEGREES,
            protection_scale: PROTECTION_SCALE,
            toughness_resistance_factor: TOUGHNESS_RESISTANCE_FACTOR,
            toughness_multiplier: TOUGHNESS_MULTIPLIER,
            energy_loss_divisor: ENERGY_LOSS_DIVISOR,
            ricochet_loss_exponent: RICOCHET_LOSS_EXPONENT,
            hp_per_joule: HP_PER_JOULE,

            spall: SpallConfig::default(),

            max_live_projectiles: MAX_LIVE_PROJECTILES,
            projectile_pool_capacity: PROJECTILE_POOL_CAPACITY,
            trail_pool_capacity: TRAIL_POOL_CAPACITY,
            trail_display_seconds: TRAIL_DISPLAY_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpallConfig {
    pub density_constant: f32,
    pub max_fragments: usize,
    pub size_ratio: f32,
    pub size_deviation: f32,
    pub min_fragment_size: f32,
    pub speed_ratio: f32,
    pub speed_deviation: f32,
    pub cone_k: f32,
    pub cone_a: f32,
    pub cone_b: f32,
    pub reference_velocity: f32,
    pub max_cone_degrees: f32,
}

impl Default for SpallConfig {
    fn default() -> Self {
        Self {
            density_constant: SPALL_DENSITY_CONSTANT,
            max_fragments: SPALL_MAX_FRAGMENTS,
            size_ratio: SPALL_SIZE_RATIO,
            size_deviation: SPALL_SIZE_DEVIATION,
            min_fragment_size: SPALL_MIN_FRAGMENT_SIZE,
            speed_ratio: SPALL_SPEED_RATIO,
            speed_deviation: SPALL_SPEED_DEVIATION,
            cone_k: SPALL_CONE_K,
            cone_a: SPALL_CONE_A,
            cone_b: SPALL_CONE_B,
            reference_velocity: SPALL_REFERENCE_VELOCITY,
            max_cone_degrees: SPALL_MAX_CONE_DEGREES,
        }
    }
}

// ============================================================================
// File Loading
// ============================================================================

fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read {what} file {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("Failed to parse {what} file {}", path.display()))
}

pub fn load_config(path: &Path) -> Result<BallisticsConfig> {
    load_json(path, "config")
}

pub fn load_material_table(path: &Path) -> Result<MaterialTable> {
    load_json(path, "material table")
}

pub fn load_definition_table(path: &Path) -> Result<DefinitionTable> {
    load_json(path, "definition table")
}
