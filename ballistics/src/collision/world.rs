use bevy_math::Vec3;
use std::any::Any;

use super::{LayerMask, RayHit, RaycastService, SurfaceId, TargetLookup, helpers::ray_vs_cuboid};
use crate::target::TargetSurface;

// ============================================================================
// Cuboid World
// ============================================================================

// An axis-aligned solid; `target` is None for plain scenery.
pub struct Cuboid {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub layer: LayerMask,
    pub target: Option<Box<dyn TargetSurface>>,
}

impl Cuboid {
    fn hit(&self, id: SurfaceId, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let collision = ray_vs_cuboid(origin, direction, max_distance, self.center, self.half_extents)?;
        Some(RayHit {
            point: origin + direction * collision.t,
            normal: collision.normal,
            distance: collision.t,
            surface: id,
        })
    }
}

/// Static geometry made of axis-aligned boxes, answering raycasts analytically.
#[derive(Default)]
pub struct CuboidWorld {
    cuboids: Vec<Cuboid>,
}

impl CuboidWorld {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_target(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        layer: LayerMask,
        target: impl TargetSurface,
    ) -> SurfaceId {
        self.push(Cuboid {
            center,
            half_extents,
            layer,
            target: Some(Box::new(target)),
        })
    }

    pub fn add_scenery(&mut self, center: Vec3, half_extents: Vec3, layer: LayerMask) -> SurfaceId {
        self.push(Cuboid {
            center,
            half_extents,
            layer,
            target: None,
        })
    }

    fn push(&mut self, cuboid: Cuboid) -> SurfaceId {
        let id = SurfaceId(self.cuboids.len() as u32);
        self.cuboids.push(cuboid);
        id
    }

    #[must_use]
    pub fn cuboid(&self, id: SurfaceId) -> Option<&Cuboid> {
        self.cuboids.get(id.0 as usize)
    }

    // Typed access to a target, e.g. to read an `ArmorPlate` ledger after a run.
    #[must_use]
    pub fn target_as<T: TargetSurface>(&self, id: SurfaceId) -> Option<&T> {
        let target: &dyn Any = self.cuboid(id)?.target.as_deref()?;
        target.downcast_ref::<T>()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cuboids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cuboids.is_empty()
    }
}

impl RaycastService for CuboidWorld {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        self.cuboids
            .iter()
            .enumerate()
            .filter(|(_, cuboid)| cuboid.layer.intersects(mask))
            .filter_map(|(index, cuboid)| cuboid.hit(SurfaceId(index as u32), origin, direction, max_distance))
            // Ties keep the lowest surface id
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn cast_against(&self, surface: SurfaceId, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.cuboid(surface)?.hit(surface, origin, direction, max_distance)
    }
}

impl TargetLookup for CuboidWorld {
    fn target_mut(&mut self, surface: SurfaceId) -> Option<&mut (dyn TargetSurface + 'static)> {
        let cuboid = self.cuboids.get_mut(surface.0 as usize)?;
        cuboid.target.as_deref_mut()
    }
}
