//! Top-level race configuration.

use crate::{CoreError, CoreResult, RaceClock, Tick};

/// Race-wide settings shared by the loop and its subsystems.
///
/// Typically loaded from a JSON file by the application crate (with the
/// `serde` feature) and passed to `RaceBuilder`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RaceConfig {
    /// Race seconds per tick.  Default: 0.05 (20 logical ticks per second).
    pub tick_secs: f64,

    /// Tick budget.  The race stops here even if cars are still running.
    pub max_ticks: u64,

    /// Laps each car must complete to finish.
    pub laps: u32,

    /// Master RNG seed.
    pub seed: u64,

    /// Call `RaceObserver::on_snapshot` every N ticks.  0 disables snapshots.
    pub snapshot_interval_ticks: u64,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            tick_secs:               0.05,
            max_ticks:               200_000,
            laps:                    3,
            seed:                    42,
            snapshot_interval_ticks: 20,
        }
    }
}

impl RaceConfig {
    /// The tick at which the race is cut off (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.max_ticks)
    }

    /// Construct a `RaceClock` pre-configured for this run.
    pub fn make_clock(&self) -> RaceClock {
        RaceClock::new(self.tick_secs)
    }

    /// Reject settings the loop cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.tick_secs.is_finite() && self.tick_secs > 0.0) {
            return Err(CoreError::Config(format!(
                "tick_secs must be a positive number, got {}",
                self.tick_secs
            )));
        }
        if self.laps == 0 {
            return Err(CoreError::Config("laps must be at least 1".into()));
        }
        if self.max_ticks == 0 {
            return Err(CoreError::Config("max_ticks must be at least 1".into()));
        }
        Ok(())
    }
}
