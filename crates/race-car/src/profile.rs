//! Static car capabilities.

use crate::{CarError, CarResult, DriverStyle};

/// Allowed top speed, km/h.
pub const TOP_SPEED_RANGE: (f64, f64) = (150.0, 400.0);
/// Allowed 0–100 km/h time, seconds.
pub const ACCELERATION_RANGE: (f64, f64) = (2.0, 10.0);
/// Allowed handling coefficient (doubles as the tire friction coefficient).
pub const HANDLING_RANGE: (f64, f64) = (0.0, 1.0);
/// Allowed fuel efficiency, km per litre.
pub const FUEL_EFFICIENCY_RANGE: (f64, f64) = (5.0, 20.0);

/// The capability profile a car is entered with.  Never mutated during a race.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarProfile {
    pub top_speed_kmh:       f64,
    /// Seconds from 0 to 100 km/h.
    pub acceleration_secs:   f64,
    pub handling:            f64,
    pub fuel_efficiency_kml: f64,
    pub style:               DriverStyle,
}

impl CarProfile {
    /// Build and validate a profile.
    pub fn new(
        top_speed_kmh:       f64,
        acceleration_secs:   f64,
        handling:            f64,
        fuel_efficiency_kml: f64,
        style:               DriverStyle,
    ) -> CarResult<Self> {
        let profile = Self {
            top_speed_kmh,
            acceleration_secs,
            handling,
            fuel_efficiency_kml,
            style,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Reject any capability outside its allowed range (NaN included).
    pub fn validate(&self) -> CarResult<()> {
        check("top_speed_kmh", self.top_speed_kmh, TOP_SPEED_RANGE)?;
        check("acceleration_secs", self.acceleration_secs, ACCELERATION_RANGE)?;
        check("handling", self.handling, HANDLING_RANGE)?;
        check("fuel_efficiency_kml", self.fuel_efficiency_kml, FUEL_EFFICIENCY_RANGE)?;
        Ok(())
    }
}

fn check(field: &'static str, value: f64, (min, max): (f64, f64)) -> CarResult<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CarError::OutOfRange { field, value, min, max })
    }
}
