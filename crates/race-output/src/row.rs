//! Plain data row types written by output backends.

use race_car::Car;
use race_core::Tick;
use race_sim::{Classification, RaceEvent};

/// One line of the event log.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub tick:      u64,
    pub race_secs: f64,
    pub kind:      &'static str,
    /// `None` for race-wide events.
    pub car:       Option<u32>,
    pub detail:    String,
}

impl EventRow {
    pub fn from_event(event: &RaceEvent, tick_secs: f64) -> Self {
        let tick = event.tick().0;
        Self {
            tick,
            race_secs: tick as f64 * tick_secs,
            kind:      event.kind(),
            car:       event.car().map(|c| c.0),
            detail:    event.to_string(),
        }
    }
}

/// One car's state at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotRow {
    pub tick:       u64,
    pub car:        u32,
    pub position:   u32,
    pub lap:        u32,
    pub distance_m: f64,
    pub speed_kmh:  f64,
    pub fuel:       f64,
    pub tire_wear:  f64,
    pub finished:   bool,
}

impl SnapshotRow {
    pub fn from_car(tick: Tick, car: &Car) -> Self {
        Self {
            tick:       tick.0,
            car:        car.id.0,
            position:   car.standing.ranking,
            lap:        car.standing.lap,
            distance_m: car.state.distance_m(),
            speed_kmh:  car.state.speed(),
            fuel:       car.state.fuel(),
            tire_wear:  car.state.tire_wear(),
            finished:   car.is_finished(),
        }
    }
}

/// One line of the final classification.
#[derive(Debug, Clone, PartialEq)]
pub struct StandingRow {
    pub position:    u32,
    pub car:         u32,
    pub name:        String,
    pub style:       &'static str,
    pub finished:    bool,
    pub finish_secs: Option<f64>,
    pub laps:        u32,
    pub best_lap:    Option<f64>,
    pub distance_m:  f64,
    pub fuel:        f64,
    pub tire_wear:   f64,
    pub collisions:  u32,
    pub shots:       u32,
    pub hits:        u32,
}

impl From<&Classification> for StandingRow {
    fn from(c: &Classification) -> Self {
        Self {
            position:    c.position,
            car:         c.car.0,
            name:        c.name.clone(),
            style:       c.style.as_str(),
            finished:    c.finished,
            finish_secs: c.finish_secs,
            laps:        c.laps_completed,
            best_lap:    c.best_lap,
            distance_m:  c.distance_m,
            fuel:        c.fuel,
            tire_wear:   c.tire_wear,
            collisions:  c.collisions.total,
            shots:       c.weapon.shots,
            hits:        c.weapon.hits,
        }
    }
}
