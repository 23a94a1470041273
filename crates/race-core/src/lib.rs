//! `race-core`: foundational types for the `rust_race` simulator.
//!
//! This crate is a dependency of every other `race-*` crate.  It has no
//! `race-*` dependencies and only `rand` and `thiserror` (plus optional
//! `serde`) externally.
//!
//! # What lives here
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | [`ids`]      | `CarId`, `PickupId`, `SegmentId`                      |
//! | [`time`]     | `Tick`, `RaceClock`                                   |
//! | [`config`]   | `RaceConfig`                                          |
//! | [`rng`]      | `CarRng` (per-car), `RaceRng` (race-level streams)    |
//! | [`error`]    | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::RaceConfig;
pub use error::{CoreError, CoreResult};
pub use ids::{CarId, PickupId, SegmentId};
pub use rng::{CarRng, RaceRng};
pub use time::{RaceClock, Tick};
