use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;

// ============================================================================
// Seeded Random Stream
// ============================================================================

/// Deterministic random stream carried by each projectile.
///
/// Seeded from the 64-bit shot seed so that every peer replaying the same shot draws the
/// same numbers in the same order.
#[derive(Debug, Clone)]
pub struct ShotRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl ShotRng {
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    // Uniform draw in [0, 1).
    pub fn uniform(&mut self) -> f32 {
        self.rng.gen_range(0.0..1.0)
    }

    // Normal draw via the Box-Muller transform.
    pub fn normal(&mut self, mean: f32, std_dev: f32) -> f32 {
        // u1 in (0, 1] so ln(u1) stays finite
        let u1 = 1.0 - self.uniform();
        let u2 = self.uniform();
        let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
        z.mul_add(std_dev, mean)
    }

    // Seed for a child stream (spall requests, fragments).
    pub fn next_seed(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

impl Default for ShotRng {
    fn default() -> Self {
        Self::from_seed(0)
    }
}
