pub mod helpers;
pub mod world;

use bevy_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::target::TargetSurface;

pub use helpers::{Collision, ray_vs_cuboid};
pub use world::{Cuboid, CuboidWorld};

// ============================================================================
// Raycast Service Types
// ============================================================================

// Handle to a struck surface, issued by the raycast service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

// Collision category bit set used to filter raycasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);
    pub const ARMOR: Self = Self(1);
    pub const SCENERY: Self = Self(1 << 1);
    pub const TERRAIN: Self = Self(1 << 2);

    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    pub surface: SurfaceId,
}

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Synchronous intersection queries used by the simulator.
///
/// `direction` is unit length. Rays that start inside a solid do not report that solid.
pub trait RaycastService {
    /// Nearest intersection along the ray among surfaces whose layer intersects `mask`.
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask) -> Option<RayHit>;

    /// Intersection with one specific surface only (used by the exit-point search).
    fn cast_against(&self, surface: SurfaceId, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;
}

/// Resolves a struck surface to its damage capability. `None` means plain scenery.
pub trait TargetLookup {
    fn target_mut(&mut self, surface: SurfaceId) -> Option<&mut (dyn TargetSurface + 'static)>;
}

/// Everything the stepping loop needs from the world.
pub trait Scene: RaycastService + TargetLookup {}

impl<T: RaycastService + TargetLookup> Scene for T {}
