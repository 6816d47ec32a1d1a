use ballistics::{ImpactOutcome, Simulation};
use range::{
    RangeReport, Scenario, build_app, is_finished,
    resources::{FiredShots, ImpactLog, RangeScene},
};
use std::{collections::HashSet, path::PathBuf};

fn scenario_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios/proving_ground.json")
}

fn run(seed_offset: u64) -> RangeReport {
    let scenario = Scenario::load(&scenario_path()).expect("scenario");
    let (world, targets) = scenario.build_world();
    let shots = scenario.shot_messages(seed_offset);
    let mut app = build_app(Simulation::default(), RangeScene { world, targets }, shots);

    for _ in 0..scenario.ticks.unwrap_or(700) {
        app.update();
        if is_finished(app.world()) {
            break;
        }
    }

    let world = app.world();
    RangeReport::collect(
        &scenario.name,
        world.resource(),
        world.resource::<RangeScene>(),
        world.resource::<FiredShots>(),
        world.resource::<ImpactLog>(),
    )
}

#[test]
fn bundled_scenario_runs_to_completion() {
    let report = run(0);

    assert_eq!(report.shots_fired, 6);
    assert_eq!(report.shots_rejected, 0);
    assert_eq!(report.live_at_end, 0);
    assert!(report.stats.impacts() > 0);
    assert!(report.outcomes.contains_key("penetrate"));
    assert_eq!(report.targets.len(), 7);
}

#[test]
fn scenery_targets_carry_no_ledger() {
    let report = run(0);

    let ground = report.targets.iter().find(|target| target.name == "ground").expect("ground");
    let backstop = report.targets.iter().find(|target| target.name == "backstop").expect("backstop");
    assert!(ground.ledger.is_none());
    assert!(backstop.ledger.is_none());

    let plate = report.targets.iter().find(|target| target.name == "thin_plate").expect("plate");
    assert!(plate.ledger.is_some_and(|ledger| ledger.penetrations > 0));
}

#[test]
fn identical_runs_produce_identical_reports() {
    let first = run(0);
    let second = run(0);

    assert_eq!(first.stats, second.stats);
    assert_eq!(first.outcomes, second.outcomes);
    assert_eq!(first.ticks, second.ticks);
}

#[test]
fn every_fired_shot_is_logged_and_destroyed() {
    let scenario = Scenario::load(&scenario_path()).expect("scenario");
    let (world, targets) = scenario.build_world();
    let mut app = build_app(Simulation::default(), RangeScene { world, targets }, scenario.shot_messages(0));

    for _ in 0..scenario.ticks.unwrap_or(700) {
        app.update();
        if is_finished(app.world()) {
            break;
        }
    }

    let world = app.world();
    let simulation = world.resource::<Simulation>();
    let fired = world.resource::<FiredShots>();
    let log = world.resource::<ImpactLog>();

    assert_eq!(fired.handles.len(), scenario.shots.len());
    for (shot_id, handle) in &fired.handles {
        assert!(simulation.projectile(*handle).is_none(), "shot {shot_id} still in flight");
    }

    // Every shot aimed down the range strikes something before it expires
    let struck: HashSet<_> = log.events.iter().map(|event| event.handle).collect();
    let aimed_downrange = scenario.shots.iter().enumerate().filter(|(_, shot)| shot.direction[0] == 0.0);
    for (shot_id, _) in aimed_downrange {
        let handle = fired.handles[&(shot_id as u32)];
        assert!(struck.contains(&handle), "shot {shot_id} never struck anything");
    }

    assert!(log.events.iter().all(|event| event.hp_after <= event.hp_before));
    assert!(
        log.events
            .iter()
            .filter(|event| event.outcome == ImpactOutcome::Penetrate)
            .all(|event| event.thickness >= 0.0)
    );
}
