//! `race-car`: the physical side of a race entrant.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`profile`]   | `CarProfile`: validated static capabilities                 |
//! | [`style`]     | `DriverStyle` + the per-style modifier / target-speed table  |
//! | [`state`]     | `Car`, `CarState` (clamped dynamic state), `Standing`        |
//! | [`grid`]      | `GridBuilder`: entrants + per-car RNGs in one step          |
//! | [`track`]     | `Segment`, `Track`, presets, `Weather`                       |
//! | [`physics`]   | Target-speed pipeline and the pure `advance` step            |
//! | [`strategy`]  | Fuel and tire projections used by rule-based drivers         |
//! | [`error`]     | `CarError`, `CarResult<T>`                                   |
//!
//! # Progress model
//!
//! A car's cumulative `distance_m` is the only stored position.  Lap index,
//! in-lap progress and total race progress are all derived from it through
//! [`Track`], so lap detection, ranking and the effect systems can never
//! disagree about where a car is.

pub mod error;
pub mod grid;
pub mod physics;
pub mod profile;
pub mod state;
pub mod strategy;
pub mod style;
pub mod track;

#[cfg(test)]
mod tests;

pub use error::{CarError, CarResult};
pub use grid::{CarRngs, GridBuilder};
pub use physics::{
    advance, is_low_fuel, optimal_speed, roll_incident, target_speed, tire_wear_over, SpeedRequest,
    LOW_FUEL_SPEED_CAP_KMH, LOW_FUEL_THRESHOLD,
};
pub use profile::CarProfile;
pub use state::{Car, CarState, Standing};
pub use strategy::{
    fuel_strategy, predict_tire_wear, FuelPlan, FuelStrategy, TireOutlook, CRITICAL_TIRE_WEAR,
};
pub use style::{DriverStyle, StyleModifiers};
pub use track::{SectionKind, Segment, SegmentKind, Track, TrackKind, Weather, WeatherEffects};
