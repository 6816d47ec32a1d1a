use bevy_ecs::resource::Resource;
use bevy_math::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    collision::Scene,
    config::BallisticsConfig,
    constants::PHYSICS_EPSILON,
    definition::DefinitionRegistry,
    error::{BallisticsError, Result},
    geometry::finite_or_zero,
    material::MaterialRegistry,
    penetration::{ImpactEvent, ImpactOutcome, Resolver},
    pool::{PoolStats, ProjectileHandle, ProjectileRegistry},
    projectile::{ProjectileKind, ProjectileState, SpawnParams},
    spall::generate_fragments,
    target::{ImpactCommands, SpallRequest},
    trail::TrailPool,
};

// ============================================================================
// Outcomes & Statistics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestroyReason {
    Depleted, // hp pool exhausted
    Expired,  // exceeded the maximum lifetime
    Jammed,   // too many resolutions in one tick
    Explicit, // destroyed by the host
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Alive,
    Destroyed(DestroyReason),
    Unknown, // handle does not refer to a live projectile
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub spawned: u64,
    pub spawned_spall: u64,
    pub rejected_spawns: u64,
    pub penetrations: u64,
    pub non_penetrations: u64,
    pub deflections: u64,
    pub no_impacts: u64,
    pub depleted: u64,
    pub expired: u64,
    pub jam_faults: u64,
    pub destroyed_explicit: u64,
}

impl SimulationStats {
    fn record_impact(&mut self, outcome: ImpactOutcome) {
        match outcome {
            ImpactOutcome::Penetrate => self.penetrations += 1,
            ImpactOutcome::NonPenetrate => self.non_penetrations += 1,
            ImpactOutcome::Deflect => self.deflections += 1,
            ImpactOutcome::NoImpact => self.no_impacts += 1,
        }
    }

    fn record_destroy(&mut self, reason: DestroyReason) {
        match reason {
            DestroyReason::Depleted => self.depleted += 1,
            DestroyReason::Expired => self.expired += 1,
            DestroyReason::Jammed => self.jam_faults += 1,
            DestroyReason::Explicit => self.destroyed_explicit += 1,
        }
    }

    #[must_use]
    pub const fn impacts(&self) -> u64 {
        self.penetrations + self.non_penetrations + self.deflections + self.no_impacts
    }

    #[must_use]
    pub const fn destroyed(&self) -> u64 {
        self.depleted + self.expired + self.jam_faults + self.destroyed_explicit
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    pub tick: u64,
    pub stepped: usize,
    pub destroyed: usize,
    pub spall_spawned: usize,
    pub spall_rejected: usize,
    pub trails_returned: usize,
}

// ============================================================================
// Simulation Context
// ============================================================================

/// Owns every live projectile plus the registries and pools they draw from.
///
/// All mutation goes through `&mut self`, so a host that shares it between systems serializes
/// access by construction.
#[derive(Resource)]
pub struct Simulation {
    config: BallisticsConfig,
    materials: MaterialRegistry,
    definitions: DefinitionRegistry,
    projectiles: ProjectileRegistry,
    trails: TrailPool,
    commands: ImpactCommands,
    impacts: Vec<ImpactEvent>,
    stats: SimulationStats,
    tick: u64,
}

impl Simulation {
    /// Every definition must name a material known to `materials`.
    pub fn new(config: BallisticsConfig, materials: MaterialRegistry, definitions: DefinitionRegistry) -> Result<Self> {
        for definition in definitions.iter() {
            materials.lookup(&definition.material)?;
        }

        info!(
            "simulation ready: {} materials, {} definitions, cap {} live projectiles",
            materials.len(),
            definitions.iter().count(),
            config.max_live_projectiles
        );

        Ok(Self {
            projectiles: ProjectileRegistry::new(config.max_live_projectiles, config.projectile_pool_capacity),
            trails: TrailPool::new(config.trail_pool_capacity, config.trail_display_seconds),
            config,
            materials,
            definitions,
            commands: ImpactCommands::new(),
            impacts: Vec::new(),
            stats: SimulationStats::default(),
            tick: 0,
        })
    }

    pub fn with_config(config: BallisticsConfig) -> Result<Self> {
        Self::new(config, MaterialRegistry::builtin(), DefinitionRegistry::builtin())
    }

    // ------------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------------

    /// Fire a primary projectile from a named definition. Unknown keys fall back to the default
    /// definition.
    pub fn create(&mut self, position: Vec3, direction: Vec3, seed: u64, definition: &str) -> Result<ProjectileHandle> {
        let definition = self.definitions.get_or_default(definition);
        let params = SpawnParams {
            position,
            velocity: direction.normalize_or_zero() * definition.muzzle_velocity,
            seed,
            diameter: definition.diameter(),
            length: definition.length(),
            material: self.materials.resolve(&definition.material),
            kind: ProjectileKind::Primary,
        };
        self.create_raw(params)
    }

    /// Low-level spawn with explicit dimensions (meters) and material.
    pub fn create_raw(&mut self, params: SpawnParams) -> Result<ProjectileHandle> {
        let valid = |value: f32| value.is_finite() && value > 0.0;
        if !valid(params.diameter) || !valid(params.length) {
            return Err(BallisticsError::InvalidDimensions {
                diameter: params.diameter,
                length: params.length,
            });
        }

        let material = self.materials.get(params.material);
        let hp_per_joule = self.config.hp_per_joule;
        let trails = &mut self.trails;

        let handle = self.projectiles.spawn(|state| {
            state.init(&params, material, hp_per_joule);
            state.velocity = finite_or_zero(state.velocity);
            state.trail = Some(trails.acquire(params.position));
        })?;

        self.stats.spawned += 1;
        if params.kind == ProjectileKind::Spall {
            self.stats.spawned_spall += 1;
        }
        Ok(handle)
    }

    // ------------------------------------------------------------------------
    // Stepping
    // ------------------------------------------------------------------------

    /// Advance one projectile by one tick, then spawn any spall its impacts requested.
    pub fn step<S: Scene + ?Sized>(&mut self, handle: ProjectileHandle, scene: &mut S) -> StepOutcome {
        let outcome = self.advance(handle, scene);
        if let StepOutcome::Destroyed(reason) = outcome {
            self.finish(handle, reason);
        }
        self.spawn_requested_spall();
        outcome
    }

    /// Step every live projectile once, in slot order, then process trail returns.
    /// Projectiles created during the tick are first stepped on the next one.
    ///
    /// Impact events accumulate across ticks until the host calls [`Self::drain_impacts`].
    pub fn tick<S: Scene + ?Sized>(&mut self, scene: &mut S) -> TickSummary {
        self.tick += 1;
        let spawned_before = self.stats.spawned_spall;
        let rejected_before = self.stats.rejected_spawns;

        let mut summary = TickSummary {
            tick: self.tick,
            ..TickSummary::default()
        };

        for handle in self.projectiles.handles() {
            summary.stepped += 1;
            if let StepOutcome::Destroyed(_) = self.step(handle, scene) {
                summary.destroyed += 1;
            }
        }

        summary.spall_spawned = (self.stats.spawned_spall - spawned_before) as usize;
        summary.spall_rejected = (self.stats.rejected_spawns - rejected_before) as usize;
        summary.trails_returned = self.trails.process_returns(self.config.tick_duration());
        summary
    }

    // The substep loop for one projectile. Never destroys; the caller does.
    fn advance<S: Scene + ?Sized>(&mut self, handle: ProjectileHandle, scene: &mut S) -> StepOutcome {
        let Self {
            config,
            materials,
            projectiles,
            commands,
            impacts,
            stats,
            ..
        } = self;

        let Some(state) = projectiles.get_mut(handle) else {
            return StepOutcome::Unknown;
        };

        state.frames_alive += 1;
        if state.frames_alive > config.max_lifetime_ticks {
            return StepOutcome::Destroyed(DestroyReason::Expired);
        }

        let dt = config.tick_seconds;
        state.velocity = finite_or_zero(state.velocity + config.gravity * dt);
        state.previous_position = state.position;

        let resolver = Resolver::new(config, materials);
        let mut remaining = 1.0_f32;
        let mut attempts = 0;

        loop {
            let speed = state.speed();
            let length = speed * dt * remaining;
            if length < PHYSICS_EPSILON {
                return StepOutcome::Alive;
            }
            let direction = state.velocity / speed;

            let Some(hit) = scene.cast(state.position, direction, length, config.layer_mask) else {
                state.position += direction * length;
                record_trail(state);
                return StepOutcome::Alive;
            };

            attempts += 1;
            if attempts > config.max_resolve_attempts {
                warn!(
                    ?handle,
                    attempts,
                    position = ?state.position,
                    "jam fault: projectile failed to resolve its tick"
                );
                return StepOutcome::Destroyed(DestroyReason::Jammed);
            }

            let event = resolver.resolve(handle, state, &hit, scene, commands);

            // A penetration also spends the path through the target
            let travelled = match event.outcome {
                ImpactOutcome::Penetrate => hit.distance + event.thickness,
                _ => hit.distance,
            };
            remaining *= 1.0 - (travelled / length).clamp(0.0, 1.0);

            stats.record_impact(event.outcome);
            impacts.push(event);
            record_trail(state);

            if state.is_depleted() {
                return StepOutcome::Destroyed(DestroyReason::Depleted);
            }
            if event.outcome.ends_tick() {
                return StepOutcome::Alive;
            }
        }
    }

    fn spawn_requested_spall(&mut self) {
        if self.commands.is_empty() {
            return;
        }

        let requests: Vec<SpallRequest> = self.commands.drain_spall().collect();
        for request in &requests {
            let fragments = generate_fragments(request, &self.config.spall, self.config.resume_offset);
            let total = fragments.len();
            let mut rejected = 0;

            for params in fragments {
                if let Err(err) = self.create_raw(params) {
                    rejected += 1;
                    self.stats.rejected_spawns += 1;
                    debug!("spall fragment rejected: {err}");
                }
            }

            if rejected > 0 {
                warn!("{rejected} of {total} spall fragments rejected at the live projectile cap");
            }
        }
    }

    // ------------------------------------------------------------------------
    // Destruction
    // ------------------------------------------------------------------------

    /// Explicitly terminate a projectile and return it to the pool.
    pub fn destroy(&mut self, handle: ProjectileHandle) -> Result<()> {
        if !self.projectiles.contains(handle) {
            return Err(BallisticsError::UnknownHandle(handle));
        }
        self.finish(handle, DestroyReason::Explicit);
        Ok(())
    }

    fn finish(&mut self, handle: ProjectileHandle, reason: DestroyReason) {
        match self.projectiles.despawn(handle) {
            Ok(mut state) => {
                if let Some(trail) = state.trail.take() {
                    self.trails.schedule_return(trail);
                }
                self.stats.record_destroy(reason);
                debug!(?handle, ?reason, frames = state.frames_alive, "projectile destroyed");
            }
            Err(err) => warn!("failed to destroy projectile: {err}"),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn projectile(&self, handle: ProjectileHandle) -> Option<&ProjectileState> {
        self.projectiles.get(handle)
    }

    #[must_use]
    pub fn handles(&self) -> Vec<ProjectileHandle> {
        self.projectiles.handles()
    }

    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.projectiles.live_count()
    }

    #[must_use]
    pub const fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    #[must_use]
    pub const fn pool_stats(&self) -> PoolStats {
        self.projectiles.pool_stats()
    }

    // Impact events recorded since the last drain, in resolution order. Undrained events are kept.
    pub fn drain_impacts(&mut self) -> Vec<ImpactEvent> {
        std::mem::take(&mut self.impacts)
    }

    #[must_use]
    pub const fn trails(&self) -> &TrailPool {
        &self.trails
    }

    #[must_use]
    pub const fn config(&self) -> &BallisticsConfig {
        &self.config
    }

    #[must_use]
    pub const fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    #[must_use]
    pub const fn definitions(&self) -> &DefinitionRegistry {
        &self.definitions
    }

    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }
}

impl Default for Simulation {
    fn default() -> Self {
        match Self::with_config(BallisticsConfig::default()) {
            Ok(simulation) => simulation,
            Err(err) => unreachable!("built-in registries are inconsistent: {err}"),
        }
    }
}

fn record_trail(state: &mut ProjectileState) {
    let position = state.position;
    if let Some(trail) = &mut state.trail {
        trail.push(position);
    }
}
