//! Per-car dynamic state.
//!
//! `CarState` keeps its fields private so the clamping invariants
//! (`0 ≤ fuel ≤ 100`, `0 ≤ tire_wear ≤ 100`, `speed ≥ 0`, distance never
//! decreasing) hold no matter which subsystem writes to it.

use race_core::{CarId, Tick};

use crate::{CarError, CarProfile, CarResult, DriverStyle};

/// Fuel and tire wear are percentages.
pub const PERCENT_MAX: f64 = 100.0;

#[inline]
fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, PERCENT_MAX) }
}

// ── CarState ──────────────────────────────────────────────────────────────────

/// The physical quantities the physics step and effect systems mutate.
///
/// `Copy` so that [`advance`][crate::advance] can return a fresh value and the
/// race loop can keep the previous one when a tick has to be discarded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarState {
    speed_kmh:  f64,
    fuel:       f64,
    tire_wear:  f64,
    distance_m: f64,
}

impl CarState {
    /// Standing start, full tank, fresh tires, on the start line.
    pub fn race_start() -> Self {
        Self::at_distance(0.0)
    }

    /// Race-start state placed `distance_m` metres into the race.
    pub fn at_distance(distance_m: f64) -> Self {
        Self {
            speed_kmh:  0.0,
            fuel:       PERCENT_MAX,
            tire_wear:  0.0,
            distance_m: if distance_m.is_finite() { distance_m.max(0.0) } else { 0.0 },
        }
    }

    #[inline] pub fn speed(&self) -> f64 { self.speed_kmh }
    #[inline] pub fn fuel(&self) -> f64 { self.fuel }
    #[inline] pub fn tire_wear(&self) -> f64 { self.tire_wear }
    #[inline] pub fn distance_m(&self) -> f64 { self.distance_m }

    /// Speed in metres per second.
    #[inline]
    pub fn speed_ms(&self) -> f64 {
        self.speed_kmh / 3.6
    }

    pub fn set_speed(&mut self, kmh: f64) {
        self.speed_kmh = if kmh.is_finite() { kmh.max(0.0) } else { 0.0 };
    }

    pub fn set_fuel(&mut self, percent: f64) {
        self.fuel = clamp_percent(percent);
    }

    pub fn adjust_fuel(&mut self, delta: f64) {
        self.set_fuel(self.fuel + delta);
    }

    pub fn set_tire_wear(&mut self, percent: f64) {
        self.tire_wear = clamp_percent(percent);
    }

    pub fn adjust_tire_wear(&mut self, delta: f64) {
        self.set_tire_wear(self.tire_wear + delta);
    }

    /// Move forward.  Negative or non-finite distances are ignored.
    pub fn travel(&mut self, metres: f64) {
        if metres.is_finite() && metres > 0.0 {
            self.distance_m += metres;
        }
    }
}

impl Default for CarState {
    fn default() -> Self {
        Self::race_start()
    }
}

// ── Standing ──────────────────────────────────────────────────────────────────

/// Race bookkeeping: laps, rank, finish.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Standing {
    /// Completed laps.
    pub lap:              u32,
    /// 1-based rank; 0 before the first ranking pass.
    pub ranking:          u32,
    pub finished_at:      Option<Tick>,
    /// Race seconds at the finish.
    pub finish_secs:      Option<f64>,
    pub lap_times:        Vec<f64>,
    /// Race seconds at which the current lap began.
    pub lap_started_secs: f64,
}

impl Standing {
    pub fn best_lap(&self) -> Option<f64> {
        self.lap_times.iter().copied().reduce(f64::min)
    }
}

// ── Car ───────────────────────────────────────────────────────────────────────

/// One race entrant.
#[derive(Clone, Debug)]
pub struct Car {
    pub id:       CarId,
    pub name:     String,
    pub profile:  CarProfile,
    pub state:    CarState,
    pub standing: Standing,
}

impl Car {
    pub fn new(id: CarId, name: impl Into<String>, profile: CarProfile) -> CarResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CarError::EmptyName);
        }
        profile.validate()?;
        Ok(Self {
            id,
            name,
            profile,
            state:    CarState::race_start(),
            standing: Standing::default(),
        })
    }

    /// Return to race-start defaults at `grid_distance_m`.
    pub fn reset_for_race(&mut self, grid_distance_m: f64) {
        self.state = CarState::at_distance(grid_distance_m);
        self.standing = Standing::default();
    }

    #[inline]
    pub fn style(&self) -> DriverStyle {
        self.profile.style
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.standing.finished_at.is_some()
    }

    /// Top speed after style bonus and tire wear, km/h.
    pub fn effective_top_speed(&self) -> f64 {
        let m = self.style().modifiers();
        self.profile.top_speed_kmh * m.speed_bonus * (1.0 - self.state.tire_wear() / 200.0)
    }

    /// 0–100 time after style and fuel load, seconds.  Lower fuel is quicker.
    pub fn effective_acceleration(&self) -> f64 {
        let m = self.style().modifiers();
        let weight_factor = 1.0 + (PERCENT_MAX - self.state.fuel()) / 500.0;
        self.profile.acceleration_secs / (m.acceleration_bonus * weight_factor)
    }

    /// Handling after style and tire wear.
    pub fn effective_handling(&self) -> f64 {
        let m = self.style().modifiers();
        self.profile.handling * m.handling_penalty * (1.0 - self.state.tire_wear() / 150.0)
    }
}
