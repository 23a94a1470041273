//! Resource projections for rule-based drivers.

use crate::physics::tire_wear_over;
use crate::{Car, Track};

/// Planning assumption: a full tank lasts this many laps for a neutral style.
const BASE_LAPS_PER_TANK: f64 = 15.0;
/// Projected wear above which the tires will not see the flag.
pub const CRITICAL_TIRE_WEAR: f64 = 90.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FuelStrategy {
    /// Not enough fuel to finish.
    MustPit,
    /// Within two laps of running dry.
    Conserve,
    /// Plenty in hand.
    Attack,
    Manage,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FuelPlan {
    pub strategy:      FuelStrategy,
    /// Projected fuel percentage per lap.
    pub per_lap:       f64,
    pub laps_possible: f64,
    pub deficit:       f64,
}

/// Project fuel use over `laps_remaining`.
pub fn fuel_strategy(car: &Car, laps_remaining: u32) -> FuelPlan {
    let per_lap = 100.0 / BASE_LAPS_PER_TANK / car.style().modifiers().fuel_penalty;
    let fuel = car.state.fuel();
    let needed = per_lap * laps_remaining as f64;
    let deficit = (needed - fuel).max(0.0);
    let laps_possible = fuel / per_lap;

    let strategy = if deficit > 0.0 {
        FuelStrategy::MustPit
    } else if laps_possible < laps_remaining as f64 + 2.0 {
        FuelStrategy::Conserve
    } else if fuel > 80.0 {
        FuelStrategy::Attack
    } else {
        FuelStrategy::Manage
    };

    FuelPlan { strategy, per_lap, laps_possible, deficit }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TireOutlook {
    /// Wear percentage one full lap adds under the track's weather.
    pub per_lap:    f64,
    /// Projected wear at the flag, capped at 100.
    pub final_wear: f64,
    /// True once the projection crosses [`CRITICAL_TIRE_WEAR`].
    pub critical:   bool,
}

/// Project tire wear over `laps_remaining` on `track`, using the same wear
/// model as [`advance`][crate::advance].
pub fn predict_tire_wear(car: &Car, track: &Track, laps_remaining: u32) -> TireOutlook {
    let per_lap: f64 = track
        .segments()
        .iter()
        .map(|seg| tire_wear_over(car, seg, track.weather, seg.length_m / 1000.0))
        .sum();
    let projected = car.state.tire_wear() + per_lap * laps_remaining as f64;
    TireOutlook {
        per_lap,
        final_wear: projected.min(100.0),
        critical:   projected > CRITICAL_TIRE_WEAR,
    }
}
