pub mod collision;
pub mod config;
pub mod constants;
pub mod definition;
pub mod error;
pub mod geometry;
pub mod io;
pub mod material;
pub mod penetration;
pub mod pool;
pub mod projectile;
pub mod protocol;
pub mod rng;
pub mod simulation;
pub mod spall;
pub mod target;
pub mod trail;

pub use collision::{CuboidWorld, LayerMask, RayHit, RaycastService, Scene, SurfaceId, TargetLookup};
pub use config::BallisticsConfig;
pub use definition::{DefinitionRegistry, ProjectileDefinition};
pub use error::{BallisticsError, Result};
pub use material::{Material, MaterialCategory, MaterialId, MaterialRegistry};
pub use penetration::{ImpactEvent, ImpactOutcome};
pub use pool::ProjectileHandle;
pub use projectile::{ProjectileKind, ProjectileState, SpawnParams};
pub use protocol::{ShotLog, ShotMessage};
pub use rng::ShotRng;
pub use simulation::{DestroyReason, Simulation, SimulationStats, StepOutcome, TickSummary};
pub use target::{ArmorPlate, ImpactCommands, ImpactReport, SpallRequest, TargetSurface};
