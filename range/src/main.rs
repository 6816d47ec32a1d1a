use anyhow::Result;
use ballistics::{
    ShotLog,
    io::{read_shot_log, write_shot_log},
};
use clap::Parser;
use std::{path::PathBuf, time::Instant};
use tracing::{info, warn};

use range::{
    RangeReport, Scenario, build_app, init_tracing, is_finished, load_simulation,
    report::write_json,
    resources::{FiredShots, ImpactLog, RangeScene},
};

const DEFAULT_TICKS: u32 = 600;

// ============================================================================
// CLI Argument Parsing
// ============================================================================

#[derive(Parser)]
#[command(author, version, about = "Ballistics Proving Ground", long_about = None)]
struct Args {
    // Scenario file describing targets and shots
    scenario: PathBuf,

    // Engine tuning overrides (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    // Material table (JSON), replaces the built-in materials
    #[arg(long)]
    materials: Option<PathBuf>,

    // Projectile definition table (JSON), replaces the built-in shells
    #[arg(long)]
    definitions: Option<PathBuf>,

    // Maximum ticks to run (defaults to the scenario's value)
    #[arg(long)]
    ticks: Option<u32>,

    // Added to every shot seed
    #[arg(long, default_value_t = 0)]
    seed_offset: u64,

    // Save the fired shots to a shot log
    #[arg(long, conflicts_with = "replay")]
    record: Option<PathBuf>,

    // Fire the shots from a shot log instead of the scenario
    #[arg(long)]
    replay: Option<PathBuf>,

    // Write every impact event as JSON
    #[arg(long)]
    impacts_out: Option<PathBuf>,

    // Write the summary report as JSON
    #[arg(long)]
    report_out: Option<PathBuf>,

    // Pace ticks at the configured tick rate instead of running flat out
    #[arg(long, default_value_t = false)]
    realtime: bool,

    // Debug level logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let scenario = Scenario::load(&args.scenario)?;
    let simulation = load_simulation(args.config.as_deref(), args.materials.as_deref(), args.definitions.as_deref())?;
    let tick_duration = simulation.config().tick_duration();

    let shots = match &args.replay {
        Some(path) => {
            let log = read_shot_log(path)?;
            info!("replaying {} shots from {}", log.shots.len(), path.display());
            log.shots
        }
        None => scenario.shot_messages(args.seed_offset),
    };

    if let Some(path) = &args.record {
        write_shot_log(path, &ShotLog::new(shots.clone()))?;
        info!("recorded {} shots to {}", shots.len(), path.display());
    }

    let (world, targets) = scenario.build_world();
    info!(
        "scenario `{}`: {} surfaces, {} shots",
        scenario.name,
        world.len(),
        shots.len()
    );

    let mut app = build_app(simulation, RangeScene { world, targets }, shots);
    let max_ticks = args.ticks.or(scenario.ticks).unwrap_or(DEFAULT_TICKS);

    let mut frame: u32 = 0;
    while frame < max_ticks {
        let update_start = Instant::now();
        app.update();
        let update_elapsed = update_start.elapsed();

        if update_elapsed > tick_duration {
            warn!(
                "tick {} took {:.2}ms (exceeded {:.2}ms budget)",
                frame,
                update_elapsed.as_secs_f64() * 1000.0,
                tick_duration.as_secs_f64() * 1000.0
            );
        } else if args.realtime {
            std::thread::sleep(tick_duration.saturating_sub(update_elapsed));
        }

        frame += 1;
        if is_finished(app.world()) {
            break;
        }
    }

    if frame == max_ticks && !is_finished(app.world()) {
        warn!("stopped after {max_ticks} ticks with projectiles still in flight");
    }

    let world = app.world();
    let report = RangeReport::collect(
        &scenario.name,
        world.resource(),
        world.resource::<RangeScene>(),
        world.resource::<FiredShots>(),
        world.resource::<ImpactLog>(),
    );
    report.log_summary();

    if let Some(path) = &args.impacts_out {
        write_json(path, &world.resource::<ImpactLog>().events)?;
        info!("impacts written to {}", path.display());
    }
    if let Some(path) = &args.report_out {
        write_json(path, &report)?;
        info!("report written to {}", path.display());
    }

    Ok(())
}

