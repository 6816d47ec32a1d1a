use anyhow::{Context, Result};
use ballistics::{
    ArmorPlate, ImpactEvent, ImpactOutcome, Simulation, SimulationStats, pool::PoolStats, target::DamageLedger,
};
use serde::Serialize;
use std::{collections::BTreeMap, path::Path};
use tracing::info;

use crate::resources::{FiredShots, ImpactLog, RangeScene};

// ============================================================================
// Range Report
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub name: String,
    pub ledger: Option<DamageLedger>, // None for scenery
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeReport {
    pub scenario: String,
    pub ticks: u64,
    pub shots_fired: usize,
    pub shots_rejected: u32,
    pub live_at_end: usize,
    pub outcomes: BTreeMap<String, usize>,
    pub stats: SimulationStats,
    pub pool: PoolStats,
    pub targets: Vec<TargetReport>,
}

impl RangeReport {
    #[must_use]
    pub fn collect(
        scenario: &str,
        simulation: &Simulation,
        scene: &RangeScene,
        fired: &FiredShots,
        log: &ImpactLog,
    ) -> Self {
        let targets = scene
            .targets
            .iter()
            .map(|(name, id)| TargetReport {
                name: name.clone(),
                ledger: scene.world.target_as::<ArmorPlate>(*id).map(|plate| plate.ledger),
            })
            .collect();

        Self {
            scenario: scenario.to_string(),
            ticks: simulation.tick_count(),
            shots_fired: fired.handles.len(),
            shots_rejected: fired.rejected,
            live_at_end: simulation.live_count(),
            outcomes: count_outcomes(&log.events),
            stats: *simulation.stats(),
            pool: simulation.pool_stats(),
            targets,
        }
    }

    pub fn log_summary(&self) {
        info!(
            "scenario `{}`: {} ticks, {} shots fired ({} rejected), {} projectiles still live",
            self.scenario, self.ticks, self.shots_fired, self.shots_rejected, self.live_at_end
        );
        for (outcome, count) in &self.outcomes {
            info!("  {outcome}: {count}");
        }
        info!(
            "  destroyed: {} depleted, {} expired, {} jammed, {} explicit; {} spall spawned, {} rejected",
            self.stats.depleted,
            self.stats.expired,
            self.stats.jam_faults,
            self.stats.destroyed_explicit,
            self.stats.spawned_spall,
            self.stats.rejected_spawns
        );
        for target in &self.targets {
            if let Some(ledger) = target.ledger {
                info!(
                    "  {}: {} penetrations, {} stopped, {} ricochets, {} spall events",
                    target.name, ledger.penetrations, ledger.non_penetrations, ledger.deflections, ledger.spall_events
                );
            }
        }
    }
}

fn outcome_name(outcome: ImpactOutcome) -> &'static str {
    match outcome {
        ImpactOutcome::Penetrate => "penetrate",
        ImpactOutcome::NonPenetrate => "non_penetrate",
        ImpactOutcome::Deflect => "deflect",
        ImpactOutcome::NoImpact => "no_impact",
    }
}

#[must_use]
pub fn count_outcomes(events: &[ImpactEvent]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for event in events {
        *counts.entry(outcome_name(event.outcome).to_string()).or_insert(0) += 1;
    }
    counts
}

// ============================================================================
// JSON Output
// ============================================================================

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {}", path.display()))
}
