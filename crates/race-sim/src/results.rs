//! Final classification.

use race_car::{Car, DriverStyle, TrackKind, Weather};
use race_core::CarId;
use race_decision::SchedulerStats;
use race_effects::{CollisionStats, WeaponStats};
use serde::{Deserialize, Serialize};

/// One car's line in the results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// 1-based.
    pub position:       u32,
    pub car:            CarId,
    pub name:           String,
    pub style:          DriverStyle,
    pub finished:       bool,
    pub finish_secs:    Option<f64>,
    pub laps_completed: u32,
    pub lap_times:      Vec<f64>,
    pub best_lap:       Option<f64>,
    pub distance_m:     f64,
    pub fuel:           f64,
    pub tire_wear:      f64,
    pub collisions:     CollisionStats,
    pub weapon:         WeaponStats,
}

impl Classification {
    pub(crate) fn from_car(car: &Car, collisions: CollisionStats, weapon: WeaponStats) -> Self {
        Self {
            position:       car.standing.ranking,
            car:            car.id,
            name:           car.name.clone(),
            style:          car.style(),
            finished:       car.is_finished(),
            finish_secs:    car.standing.finish_secs,
            laps_completed: car.standing.lap,
            lap_times:      car.standing.lap_times.clone(),
            best_lap:       car.standing.best_lap(),
            distance_m:     car.state.distance_m(),
            fuel:           car.state.fuel(),
            tire_wear:      car.state.tire_wear(),
            collisions,
            weapon,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FastestLap {
    pub car:  CarId,
    pub name: String,
    /// 1-based.
    pub lap:  u32,
    pub secs: f64,
}

/// Everything a race produced, in finishing order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaceResults {
    pub track:       String,
    pub track_kind:  TrackKind,
    pub weather:     Weather,
    pub laps:        u32,
    pub ticks:       u64,
    pub race_secs:   f64,
    /// Every car took the flag.
    pub completed:   bool,
    /// An observer stopped the race.
    pub aborted:     bool,
    pub standings:   Vec<Classification>,
    pub fastest_lap: Option<FastestLap>,
    pub collisions:  u64,
    pub decisions:   SchedulerStats,
}

impl RaceResults {
    pub fn winner(&self) -> Option<&Classification> {
        self.standings.first().filter(|c| c.finished)
    }
}

/// Quickest single lap across `cars`; earlier laps win ties.
pub(crate) fn fastest_lap(cars: &[Car]) -> Option<FastestLap> {
    cars.iter()
        .flat_map(|car| {
            car.standing
                .lap_times
                .iter()
                .enumerate()
                .map(move |(i, &secs)| (car, i as u32 + 1, secs))
        })
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(car, lap, secs)| FastestLap { car: car.id, name: car.name.clone(), lap, secs })
}
