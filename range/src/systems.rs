use ballistics::{BallisticsError, Simulation};
use bevy_ecs::prelude::*;
use tracing::{debug, info, warn};

use crate::resources::{FiredShots, ImpactLog, RangeScene, ShotQueue, TickCounter};

// ============================================================================
// Shot Firing System
// ============================================================================

// Create a projectile for every shot due this tick.
pub fn fire_due_shots_system(
    tick: Res<TickCounter>,
    mut queue: ResMut<ShotQueue>,
    mut simulation: ResMut<Simulation>,
    mut fired: ResMut<FiredShots>,
) {
    for shot in queue.take_due(tick.0) {
        match simulation.create(shot.position(), shot.direction(), shot.seed, &shot.definition) {
            Ok(handle) => {
                debug!(shot = shot.shot_id, ?handle, definition = %shot.definition, "shot fired");
                fired.handles.insert(shot.shot_id, handle);
            }
            Err(err @ BallisticsError::CapacityExceeded { .. }) => {
                warn!("shot {} rejected: {err}", shot.shot_id);
                fired.rejected += 1;
            }
            Err(err) => {
                warn!("shot {} failed: {err}", shot.shot_id);
                fired.rejected += 1;
            }
        }
    }
}

// ============================================================================
// Simulation Step System
// ============================================================================

// Advance every live projectile by one fixed tick.
pub fn step_simulation_system(
    mut simulation: ResMut<Simulation>,
    mut scene: ResMut<RangeScene>,
    mut tick: ResMut<TickCounter>,
    mut log: ResMut<ImpactLog>,
) {
    let summary = simulation.tick(&mut scene.world);

    if summary.spall_rejected > 0 {
        warn!(
            "tick {}: {} spall fragments rejected at the projectile cap",
            tick.0, summary.spall_rejected
        );
    }

    log.last_tick = Some(summary);
    tick.0 += 1;
}

// ============================================================================
// Impact Collection System
// ============================================================================

// Move this tick's impact events into the range log.
pub fn collect_impacts_system(mut simulation: ResMut<Simulation>, mut log: ResMut<ImpactLog>, tick: Res<TickCounter>) {
    let events = simulation.drain_impacts();
    if events.is_empty() {
        return;
    }

    for event in &events {
        debug!(
            tick = tick.0,
            handle = %event.handle,
            surface = event.surface.0,
            outcome = ?event.outcome,
            thickness = event.thickness,
            hp = event.hp_after,
            "impact"
        );
    }

    let penetrations = events
        .iter()
        .filter(|event| event.outcome == ballistics::ImpactOutcome::Penetrate)
        .count();
    if penetrations > 0 {
        info!("tick {}: {} impacts, {} penetrations", tick.0, events.len(), penetrations);
    }

    log.events.extend(events);
}
