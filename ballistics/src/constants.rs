// ============================================================================
// Simulation Clock
// ============================================================================

pub const TICK_SECONDS: f32 = 0.02; // Fixed physics tick (50 Hz)
pub const GRAVITY: f32 = 9.81; // meters per second squared
pub const MAX_LIFETIME_TICKS: u32 = 500; // 10 seconds at 50 Hz

// ============================================================================
// Substep Resolution
// ============================================================================

// Resolutions allowed in a single tick before the projectile is considered jammed.
pub const MAX_RESOLVE_ATTEMPTS: u32 = 10;

// Distance past an entry/exit point at which a projectile resumes after an impact.
pub const RESUME_OFFSET: f32 = 0.001; // meters

// Exit-point search: probe distances start here and double up to the limit.
pub const EXIT_SEARCH_START: f32 = 0.1; // meters
pub const EXIT_SEARCH_LIMIT: f32 = 10.0; // meters

// ============================================================================
// Penetration Tuning
// ============================================================================

// Scales the deflection factor; balances (area / mass) / v^2 into a ricochet score.
pub const DEFLECTION_CONSTANT: f32 = 6.0e8;

// Maximum diffraction applied when the deflection factor reaches 1.
pub const MAX_DIFFRACTION_DEGREES: f32 = 15.0;

// Converts thickness * (hardness + toughness) into hp pool units.
pub const PROTECTION_SCALE: f32 = 2000.0;

// Toughness coefficient parameters used for protection values.
pub const TOUGHNESS_RESISTANCE_FACTOR: f32 = 18.0;
pub const TOUGHNESS_MULTIPLIER: f32 = 0.75;

// Divisor applied to protection / hp before clamping into an energy loss ratio.
pub const ENERGY_LOSS_DIVISOR: f32 = 1.3;

// Ricochet energy loss: 1 - exp(-cos(theta) * RICOCHET_LOSS_EXPONENT).
pub const RICOCHET_LOSS_EXPONENT: f32 = 3.0;

// hp pool units granted per joule of muzzle kinetic energy.
pub const HP_PER_JOULE: f32 = 1.0e-3;

// ============================================================================
// Spall
// ============================================================================

pub const SPALL_DENSITY_CONSTANT: f32 = 10_000.0; // fragments per (m * m)
pub const SPALL_MAX_FRAGMENTS: usize = 500;
pub const SPALL_SIZE_RATIO: f32 = 0.1; // mean fragment size relative to projectile diameter
pub const SPALL_SIZE_DEVIATION: f32 = 0.3; // standard deviation relative to mean size
pub const SPALL_MIN_FRAGMENT_SIZE: f32 = 1.0e-4; // meters
pub const SPALL_SPEED_RATIO: f32 = 0.3; // mean fragment speed relative to incident speed
pub const SPALL_SPEED_DEVIATION: f32 = 0.1; // relative to incident speed

// coneAngle = k * (radius / thickness)^a * (reference / speed)^b
pub const SPALL_CONE_K: f32 = 0.35; // radians
pub const SPALL_CONE_A: f32 = 0.5;
pub const SPALL_CONE_B: f32 = 0.25;
pub const SPALL_REFERENCE_VELOCITY: f32 = 1000.0; // meters per second
pub const SPALL_MAX_CONE_DEGREES: f32 = 80.0;

// ============================================================================
// Registry & Pools
// ============================================================================

pub const MAX_LIVE_PROJECTILES: usize = 100_000;
pub const PROJECTILE_POOL_CAPACITY: usize = 4096;
pub const TRAIL_POOL_CAPACITY: usize = 512;
pub const TRAIL_DISPLAY_SECONDS: f32 = 1.5;

// ============================================================================
// Floating-Point Comparisons
// ============================================================================

// Small value for floating-point comparisons (near-zero checks, division guards).
pub const PHYSICS_EPSILON: f32 = 1e-6;
