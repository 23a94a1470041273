//! Race observer trait: the renderer and telemetry boundary.

use race_car::{Car, Track};
use race_core::{CarId, Tick};
use race_decision::Action;
use race_effects::{CollisionEvent, HitMarker, Pickup, PowerUpKind};

use crate::{RaceEvent, RaceResults};

/// Returned from [`RaceObserver::on_frame`].  `Stop` aborts the race after
/// the current tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    Continue,
    Stop,
}

/// What a renderer needs to draw one car.
#[derive(Clone, Debug, PartialEq)]
pub struct CarFrame {
    pub car:       CarId,
    /// Completed laps.
    pub lap:       u32,
    /// In-lap progress, `[0, 1)`.
    pub progress:  f64,
    pub speed_kmh: f64,
    /// 1-based.
    pub position:  u32,
    pub action:    Action,
    /// Sources of the effects currently on the car.
    pub effects:   Vec<PowerUpKind>,
    pub protected: bool,
    pub finished:  bool,
}

/// Read-only view of the race after a tick.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    pub tick:        Tick,
    pub race_secs:   f64,
    /// Indexed by `CarId`.
    pub cars:        &'a [CarFrame],
    pub pickups:     &'a [Pickup],
    pub hit_markers: &'a [HitMarker],
    /// Collisions resolved this tick.
    pub collisions:  &'a [CollisionEvent],
}

/// Callbacks invoked by [`Race::run`][crate::Race::run] at key points in the
/// tick loop.
///
/// All methods have default implementations so implementors only need to
/// override what they care about.
///
/// # Example: lap printer
///
/// ```rust,ignore
/// struct LapPrinter;
///
/// impl RaceObserver for LapPrinter {
///     fn on_event(&mut self, event: &RaceEvent) {
///         if let RaceEvent::LapCompleted { car, lap, lap_secs, .. } = event {
///             println!("{car} lap {lap}: {lap_secs:.3}s");
///         }
///     }
/// }
/// ```
pub trait RaceObserver {
    /// Called once before the first tick.
    fn on_race_start(&mut self, _cars: &[Car], _track: &Track) {}

    /// Called after every tick.  Returning [`Flow::Stop`] aborts the race.
    fn on_frame(&mut self, _frame: &FrameView<'_>) -> Flow {
        Flow::Continue
    }

    /// Called for every event, in order, after the tick that produced it.
    fn on_event(&mut self, _event: &RaceEvent) {}

    /// Called every `config.snapshot_interval_ticks` ticks with the full car
    /// records.
    fn on_snapshot(&mut self, _tick: Tick, _cars: &[Car]) {}

    /// Called once with the final results.
    fn on_race_end(&mut self, _results: &RaceResults) {}
}

/// A [`RaceObserver`] that does nothing.
pub struct NoopObserver;

impl RaceObserver for NoopObserver {}
