//! What a decision source sees about one car.

use race_car::{FuelStrategy, SectionKind, Weather};
use race_core::{CarId, Tick};
use race_effects::{CollisionRisk, PowerUpKind};
use serde::Serialize;

use crate::{DecisionError, DecisionResult};

/// Coarse race phase from overall completion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RacePhase {
    Start,
    Early,
    Middle,
    Late,
    Final,
}

impl RacePhase {
    /// `completion` is race distance covered over race distance, `[0, 1]`.
    pub fn from_completion(completion: f64) -> Self {
        if completion < 0.1 {
            RacePhase::Start
        } else if completion < 0.3 {
            RacePhase::Early
        } else if completion < 0.7 {
            RacePhase::Middle
        } else if completion < 0.9 {
            RacePhase::Late
        } else {
            RacePhase::Final
        }
    }
}

/// A read-only snapshot of one car's race, built by the race loop when that
/// car is due a decision.
///
/// This is also the oracle's request payload; field names are the wire
/// format.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RaceSituation {
    pub car:             CarId,
    pub name:            String,
    /// 1-based.
    pub position:        u32,
    pub total_cars:      u32,
    /// Completed laps.
    pub lap:             u32,
    pub total_laps:      u32,
    /// Race distance covered over race distance.
    pub completion:      f64,
    /// Metres to the car directly ahead / behind, if any.
    pub gap_ahead_m:     Option<f64>,
    pub gap_behind_m:    Option<f64>,
    pub speed_kmh:       f64,
    pub fuel:            f64,
    pub tire_wear:       f64,
    pub segment:         SectionKind,
    pub weather:         Weather,
    pub fuel_strategy:   FuelStrategy,
    /// Projected tire wear added per lap at the current pace of wear.
    pub wear_per_lap:    f64,
    /// The projection crosses critical wear before the flag.
    pub tires_critical:  bool,
    pub inventory:       Vec<PowerUpKind>,
    pub collision_risk:  CollisionRisk,
    pub ammo:            u32,
    pub can_fire:        bool,
    pub target_ahead:    Option<CarId>,
    /// Fraction of a lap.
    pub target_distance: Option<f64>,
    pub target_in_range: bool,
}

impl RaceSituation {
    #[inline]
    pub fn phase(&self) -> RacePhase {
        RacePhase::from_completion(self.completion)
    }

    pub fn to_json(&self) -> DecisionResult<String> {
        serde_json::to_string(self).map_err(|e| DecisionError::Situation(e.to_string()))
    }
}

/// What an [`Oracle`][crate::Oracle] is asked.
#[derive(Clone, Debug, PartialEq)]
pub struct OracleRequest {
    pub car:       CarId,
    /// Tick the request was submitted.
    pub tick:      Tick,
    /// JSON-serialized [`RaceSituation`].
    pub situation: String,
}
