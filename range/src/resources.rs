use ballistics::{CuboidWorld, ImpactEvent, ProjectileHandle, ShotMessage, SurfaceId, TickSummary};
use bevy_ecs::prelude::*;
use std::collections::{HashMap, VecDeque};

// ============================================================================
// Bevy Resources
// ============================================================================

// Static geometry the shots fly through, with the scenario's target names.
#[derive(Resource)]
pub struct RangeScene {
    pub world: CuboidWorld,
    pub targets: Vec<(String, SurfaceId)>,
}

// Shots not yet fired, ordered by tick.
#[derive(Resource, Default)]
pub struct ShotQueue(VecDeque<ShotMessage>);

impl ShotQueue {
    #[must_use]
    pub fn new(mut shots: Vec<ShotMessage>) -> Self {
        shots.sort_by_key(|shot| shot.tick);
        Self(shots.into())
    }

    // Pop every shot due at or before `tick`.
    pub fn take_due(&mut self, tick: u32) -> Vec<ShotMessage> {
        let mut due = Vec::new();
        while self.0.front().is_some_and(|shot| shot.tick <= tick) {
            if let Some(shot) = self.0.pop_front() {
                due.push(shot);
            }
        }
        due
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

// Current range tick (advanced after each simulation step).
#[derive(Resource, Default)]
pub struct TickCounter(pub u32);

// Shot id -> projectile, plus the shots the simulation refused.
#[derive(Resource, Default)]
pub struct FiredShots {
    pub handles: HashMap<u32, ProjectileHandle>,
    pub rejected: u32,
}

#[derive(Resource, Default)]
pub struct ImpactLog {
    pub events: Vec<ImpactEvent>,
    pub last_tick: Option<TickSummary>,
}
