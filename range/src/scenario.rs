use anyhow::{Context, Result, bail};
use ballistics::{ArmorPlate, CuboidWorld, LayerMask, ShotMessage, SurfaceId};
use bevy_math::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Scenario Files
// ============================================================================

// A proving-ground layout plus the shots fired into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub ticks: Option<u32>,
    pub targets: Vec<TargetSpec>,
    pub shots: Vec<ShotSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetLayer {
    #[default]
    Armor,
    Scenery,
    Terrain,
}

impl TargetLayer {
    #[must_use]
    pub const fn mask(self) -> LayerMask {
        match self {
            Self::Armor => LayerMask::ARMOR,
            Self::Scenery => LayerMask::SCENERY,
            Self::Terrain => LayerMask::TERRAIN,
        }
    }
}

const fn default_dampening() -> f32 {
    1.0
}

const fn default_spall() -> bool {
    true
}

// An axis-aligned box. Without a material it is plain scenery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSpec {
    pub name: String,
    pub center: [f32; 3],
    pub half_extents: [f32; 3],
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub layer: TargetLayer,
    #[serde(default = "default_dampening")]
    pub dampening: f32,
    #[serde(default = "default_spall")]
    pub spall: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotSpec {
    pub tick: u32,
    pub seed: u64,
    pub position: [f32; 3],
    pub direction: [f32; 3],
    pub definition: String,
}

// Surfaces built from a scenario, in file order.
pub type TargetIndex = Vec<(String, SurfaceId)>;

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).with_context(|| format!("Failed to read scenario {}", path.display()))?;
        let scenario: Self =
            serde_json::from_slice(&data).with_context(|| format!("Failed to parse scenario {}", path.display()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        for target in &self.targets {
            if target.half_extents.iter().any(|extent| !extent.is_finite() || *extent < 0.0) {
                bail!("target `{}` has invalid half extents {:?}", target.name, target.half_extents);
            }
        }
        for (index, shot) in self.shots.iter().enumerate() {
            if Vec3::from_array(shot.direction).length_squared() == 0.0 {
                bail!("shot {index} has a zero direction");
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn build_world(&self) -> (CuboidWorld, TargetIndex) {
        let mut world = CuboidWorld::new();
        let mut index = Vec::with_capacity(self.targets.len());

        for target in &self.targets {
            let center = Vec3::from_array(target.center);
            let half_extents = Vec3::from_array(target.half_extents);
            let layer = target.layer.mask();

            let id = match &target.material {
                Some(material) => {
                    let mut plate = ArmorPlate::new(material).with_dampening(target.dampening);
                    if !target.spall {
                        plate = plate.without_spall();
                    }
                    world.add_target(center, half_extents, layer, plate)
                }
                None => world.add_scenery(center, half_extents, layer),
            };
            index.push((target.name.clone(), id));
        }

        (world, index)
    }

    /// Shot messages in firing order. `seed_offset` is added to every seed.
    #[must_use]
    pub fn shot_messages(&self, seed_offset: u64) -> Vec<ShotMessage> {
        let mut shots: Vec<ShotMessage> = self
            .shots
            .iter()
            .enumerate()
            .map(|(index, shot)| ShotMessage {
                shot_id: index as u32,
                tick: shot.tick,
                seed: shot.seed.wrapping_add(seed_offset),
                position: shot.position,
                direction: shot.direction,
                definition: shot.definition.clone(),
            })
            .collect();
        // Stable: shots on the same tick keep file order
        shots.sort_by_key(|shot| shot.tick);
        shots
    }
}
