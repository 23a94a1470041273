//! Discrete race events handed to [`RaceObserver::on_event`][crate::RaceObserver::on_event].

use std::fmt;

use race_core::{CarId, Tick};
use race_decision::{Action, DecisionSource};
use race_effects::{CollisionKind, PowerUpKind};
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    SpinOut,
}

/// Everything the telemetry boundary hears about, in the order it happened
/// within a tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RaceEvent {
    RaceStarted {
        tick:  Tick,
        cars:  usize,
        laps:  u32,
        track: String,
    },
    DecisionAdopted {
        tick:       Tick,
        car:        CarId,
        action:     Action,
        confidence: f64,
        source:     DecisionSource,
    },
    LapCompleted {
        tick:     Tick,
        car:      CarId,
        /// 1-based number of the lap just completed.
        lap:      u32,
        lap_secs: f64,
    },
    Overtake {
        tick:     Tick,
        car:      CarId,
        passed:   CarId,
        /// New 1-based position of `car`.
        position: u32,
    },
    Collision {
        tick:     Tick,
        at_fault: CarId,
        victim:   CarId,
        kind:     CollisionKind,
        severity: f64,
    },
    Incident {
        tick: Tick,
        car:  CarId,
        kind: IncidentKind,
    },
    WeaponHit {
        tick:     Tick,
        shooter:  CarId,
        target:   CarId,
        absorbed: bool,
    },
    ItemUsed {
        tick:    Tick,
        car:     CarId,
        item:    PowerUpKind,
        hit:     Vec<CarId>,
        blocked: Vec<CarId>,
    },
    PickupCollected {
        tick: Tick,
        car:  CarId,
        item: PowerUpKind,
    },
    LowFuel {
        tick: Tick,
        car:  CarId,
        fuel: f64,
    },
    Finished {
        tick:      Tick,
        car:       CarId,
        position:  u32,
        race_secs: f64,
    },
    RaceEnded {
        tick:      Tick,
        completed: bool,
    },
}

impl RaceEvent {
    pub fn tick(&self) -> Tick {
        match *self {
            RaceEvent::RaceStarted { tick, .. }
            | RaceEvent::DecisionAdopted { tick, .. }
            | RaceEvent::LapCompleted { tick, .. }
            | RaceEvent::Overtake { tick, .. }
            | RaceEvent::Collision { tick, .. }
            | RaceEvent::Incident { tick, .. }
            | RaceEvent::WeaponHit { tick, .. }
            | RaceEvent::ItemUsed { tick, .. }
            | RaceEvent::PickupCollected { tick, .. }
            | RaceEvent::LowFuel { tick, .. }
            | RaceEvent::Finished { tick, .. }
            | RaceEvent::RaceEnded { tick, .. } => tick,
        }
    }

    /// The car the event is about, if any.
    pub fn car(&self) -> Option<CarId> {
        match *self {
            RaceEvent::RaceStarted { .. } | RaceEvent::RaceEnded { .. } => None,
            RaceEvent::DecisionAdopted { car, .. }
            | RaceEvent::LapCompleted { car, .. }
            | RaceEvent::Overtake { car, .. }
            | RaceEvent::Incident { car, .. }
            | RaceEvent::ItemUsed { car, .. }
            | RaceEvent::PickupCollected { car, .. }
            | RaceEvent::LowFuel { car, .. }
            | RaceEvent::Finished { car, .. } => Some(car),
            RaceEvent::Collision { at_fault, .. } => Some(at_fault),
            RaceEvent::WeaponHit { shooter, .. } => Some(shooter),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RaceEvent::RaceStarted { .. }     => "race_started",
            RaceEvent::DecisionAdopted { .. } => "decision",
            RaceEvent::LapCompleted { .. }    => "lap",
            RaceEvent::Overtake { .. }        => "overtake",
            RaceEvent::Collision { .. }       => "collision",
            RaceEvent::Incident { .. }        => "incident",
            RaceEvent::WeaponHit { .. }       => "weapon_hit",
            RaceEvent::ItemUsed { .. }        => "item_used",
            RaceEvent::PickupCollected { .. } => "pickup",
            RaceEvent::LowFuel { .. }         => "low_fuel",
            RaceEvent::Finished { .. }        => "finished",
            RaceEvent::RaceEnded { .. }       => "race_ended",
        }
    }
}

/// One-line human description, used for the CSV `detail` column.
impl fmt::Display for RaceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceEvent::RaceStarted { cars, laps, track, .. } => {
                write!(f, "{cars} cars, {laps} laps at {track}")
            }
            RaceEvent::DecisionAdopted { action, confidence, source, .. } => {
                write!(f, "{action} ({confidence:.2}, {source:?})")
            }
            RaceEvent::LapCompleted { lap, lap_secs, .. } => write!(f, "lap {lap} in {lap_secs:.3}s"),
            RaceEvent::Overtake { passed, position, .. } => write!(f, "passed {passed} for P{position}"),
            RaceEvent::Collision { victim, kind, severity, .. } => {
                write!(f, "{kind} with {victim}, severity {severity:.2}")
            }
            RaceEvent::Incident { kind, .. } => write!(f, "{kind:?}"),
            RaceEvent::WeaponHit { target, absorbed, .. } => {
                write!(f, "hit {target}{}", if *absorbed { " (absorbed)" } else { "" })
            }
            RaceEvent::ItemUsed { item, hit, blocked, .. } => {
                write!(f, "{item}: {} hit, {} blocked", hit.len(), blocked.len())
            }
            RaceEvent::PickupCollected { item, .. } => write!(f, "collected {item}"),
            RaceEvent::LowFuel { fuel, .. } => write!(f, "fuel {fuel:.1}%"),
            RaceEvent::Finished { position, race_secs, .. } => {
                write!(f, "P{position} in {race_secs:.3}s")
            }
            RaceEvent::RaceEnded { completed, .. } => {
                f.write_str(if *completed { "all cars finished" } else { "stopped early" })
            }
        }
    }
}
