//! `race-sim`: race loop orchestrator for the rust_race simulator.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.max_ticks:
//!   ① Poll    : scheduler.poll(tick, situations); never blocks.
//!   ② Adopt   : fresh decisions pay their one-shot cost, may use an item.
//!   ③ Physics : target_speed → advance → corner incident roll.
//!   ④ Collide : pair rolls, speed penalties, pair cooldowns.
//!   ⑤ Fire    : cars deciding `fire` shoot at the car ahead.
//!   ⑥ Pickups : collection, then effect / respawn / cooldown / marker decay.
//!   ⑦ Laps    : lap times, finish detection, scheduler retirement.
//!   ⑧ Rank    : finishers first, then by distance; overtake events.
//! ```
//!
//! The loop stops when every car has finished, when `max_ticks` is reached,
//! or when the observer returns [`Flow::Stop`].  It always produces
//! [`RaceResults`].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use race_car::{GridBuilder, Track, TrackKind};
//! use race_core::RaceConfig;
//! use race_sim::{NoopObserver, RaceBuilder};
//!
//! let (cars, rngs) = GridBuilder::new(42).entrant("Apex", profile).build()?;
//! let mut race = RaceBuilder::new(RaceConfig::default(), Track::preset(TrackKind::Speed), cars, rngs)
//!     .build()?;
//! let results = race.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod events;
pub mod observer;
pub mod race;
pub mod results;


pub use builder::RaceBuilder;
pub use error::{SimError, SimResult};
pub use events::{IncidentKind, RaceEvent};
pub use observer::{CarFrame, Flow, FrameView, NoopObserver, RaceObserver};
pub use race::{Race, RaceState};
pub use results::{Classification, FastestLap, RaceResults};
