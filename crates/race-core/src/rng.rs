//! Deterministic per-car and race-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each car gets its own `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (car_id * MIXING_CONSTANT)
//!
//! Race-wide subsystems (collision rolls, pickup draws) each take a child
//! stream from one `RaceRng` so that adding draws to one subsystem does not
//! shift the sequence seen by another.  Oracle latency is the only source of
//! run-to-run variation; with a synchronous provider a seed fully determines
//! the race.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::CarId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── CarRng ────────────────────────────────────────────────────────────────────

/// Per-car deterministic RNG (chaotic driving, corner incidents).
pub struct CarRng(SmallRng);

impl CarRng {
    /// Seed deterministically from the run's global seed and a car ID.
    pub fn new(global_seed: u64, car: CarId) -> Self {
        let seed = global_seed ^ (car.0 as u64).wrapping_mul(MIXING_CONSTANT);
        CarRng(SmallRng::seed_from_u64(seed))
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}

// ── RaceRng ───────────────────────────────────────────────────────────────────

/// Race-level RNG for subsystem rolls that involve more than one car.
///
/// Only used from the single-threaded race loop.
pub struct RaceRng(SmallRng);

impl RaceRng {
    pub fn new(seed: u64) -> Self {
        RaceRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child stream with a different seed offset.
    pub fn child(&mut self, offset: u64) -> RaceRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        RaceRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
