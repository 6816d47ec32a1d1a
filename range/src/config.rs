use anyhow::{Context, Result};
use ballistics::{
    BallisticsConfig, DefinitionRegistry, MaterialRegistry, Simulation,
    config::{load_config, load_definition_table, load_material_table},
};
use std::path::Path;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILTER: &str = "info";
const VERBOSE_LOG_FILTER: &str = "debug";

// ============================================================================
// Logging
// ============================================================================

// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { VERBOSE_LOG_FILTER } else { LOG_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // Ignore the error if a subscriber is already installed (tests)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

// ============================================================================
// Simulation Configuration
// ============================================================================

/// Build the simulation from optional override files, falling back to built-in tables.
pub fn load_simulation(
    config: Option<&Path>,
    materials: Option<&Path>,
    definitions: Option<&Path>,
) -> Result<Simulation> {
    let config = config.map_or_else(|| Ok(BallisticsConfig::default()), load_config)?;

    let materials = match materials {
        Some(path) => MaterialRegistry::from_table(load_material_table(path)?)
            .with_context(|| format!("Invalid material table {}", path.display()))?,
        None => MaterialRegistry::builtin(),
    };

    let definitions = match definitions {
        Some(path) => DefinitionRegistry::from_table(load_definition_table(path)?)
            .with_context(|| format!("Invalid definition table {}", path.display()))?,
        None => DefinitionRegistry::builtin(),
    };

    Simulation::new(config, materials, definitions).context("Failed to build simulation")
}
