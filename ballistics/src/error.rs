use thiserror::Error;

use crate::pool::ProjectileHandle;

/// Failures surfaced by the engine's public operations.
///
/// Per-projectile faults that happen inside a tick (jams, spall rejected at the cap) are not
/// reported through this type; they are logged and counted in `SimulationStats`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BallisticsError {
    #[error("live projectile cap reached ({live}/{cap}), spawn rejected")]
    CapacityExceeded { live: usize, cap: usize },

    #[error("material `{0}` not found")]
    MaterialNotFound(String),

    #[error("projectile definition `{0}` not found")]
    DefinitionNotFound(String),

    #[error("material `{key}` is invalid: {reason}")]
    InvalidMaterial { key: String, reason: String },

    #[error("projectile definition `{key}` is invalid: {reason}")]
    InvalidDefinition { key: String, reason: String },

    #[error("duplicate registry key `{0}`")]
    DuplicateKey(String),

    #[error("invalid projectile dimensions: diameter {diameter} m, length {length} m")]
    InvalidDimensions { diameter: f32, length: f32 },

    #[error("unknown projectile handle {0:?}")]
    UnknownHandle(ProjectileHandle),
}

pub type Result<T, E = BallisticsError> = std::result::Result<T, E>;
