//! Race time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter.  The mapping to race
//! seconds is held in `RaceClock`:
//!
//!   race_secs = tick * tick_secs
//!
//! Integer ticks keep ordering, cadence and cooldown arithmetic exact.  Only
//! the physics and timed effects see the floating-point `tick_secs`.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute race tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── RaceClock ─────────────────────────────────────────────────────────────────

/// Converts between tick counts and elapsed race seconds.
///
/// Cheap to copy; holds no heap data.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RaceClock {
    /// Race seconds represented by one tick.
    pub tick_secs:    f64,
    /// The current tick, advanced once per loop iteration.
    pub current_tick: Tick,
}

impl RaceClock {
    pub fn new(tick_secs: f64) -> Self {
        Self { tick_secs, current_tick: Tick::ZERO }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed race seconds at the current tick.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.secs_at(self.current_tick)
    }

    /// Race seconds at an arbitrary tick.
    #[inline]
    pub fn secs_at(&self, tick: Tick) -> f64 {
        tick.0 as f64 * self.tick_secs
    }

    /// How many ticks span `secs` seconds? Rounds up.
    #[inline]
    pub fn ticks_for_secs(&self, secs: f64) -> u64 {
        if secs <= 0.0 {
            return 0;
        }
        (secs / self.tick_secs).ceil() as u64
    }
}

impl fmt::Display for RaceClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.elapsed_secs().max(0.0);
        let minutes = (secs / 60.0).floor() as u64;
        write!(f, "{} ({}:{:06.3})", self.current_tick, minutes, secs - minutes as f64 * 60.0)
    }
}
