pub mod config;
pub mod report;
pub mod resources;
pub mod scenario;
pub mod systems;

pub use config::{init_tracing, load_simulation};
pub use report::RangeReport;
pub use scenario::Scenario;

use ballistics::{ShotMessage, Simulation};
use bevy_app::{App, Update};
use bevy_ecs::{prelude::*, schedule::ExecutorKind};

use crate::{
    resources::{FiredShots, ImpactLog, RangeScene, ShotQueue, TickCounter},
    systems::{collect_impacts_system, fire_due_shots_system, step_simulation_system},
};

// ============================================================================
// App Construction
// ============================================================================

/// Headless app that fires `shots` into `scene`, one simulation tick per `App::update`.
#[must_use]
pub fn build_app(simulation: Simulation, scene: RangeScene, shots: Vec<ShotMessage>) -> App {
    let mut app = App::new();

    // All registry and pool mutation happens from one thread, in this order
    app.edit_schedule(Update, |schedule| {
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    });

    app.insert_resource(simulation)
        .insert_resource(scene)
        .insert_resource(ShotQueue::new(shots))
        .insert_resource(TickCounter::default())
        .insert_resource(FiredShots::default())
        .insert_resource(ImpactLog::default())
        .add_systems(
            Update,
            (fire_due_shots_system, step_simulation_system, collect_impacts_system).chain(),
        );

    app
}

// Nothing left to fire and nothing in flight.
#[must_use]
pub fn is_finished(world: &World) -> bool {
    let queue_empty = world.get_resource::<ShotQueue>().is_none_or(ShotQueue::is_empty);
    let none_live = world.get_resource::<Simulation>().is_none_or(|sim| sim.live_count() == 0);
    queue_empty && none_live
}
