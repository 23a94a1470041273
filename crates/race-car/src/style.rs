//! Driver styles as a closed set of table rows.
//!
//! Every style-dependent number lives in [`STYLE_TABLE`]: the five modifier
//! factors and the function that turns a segment's optimal speed into the
//! style's target speed.  Physics looks a style up once per step instead of
//! branching on it.

use std::fmt;
use std::str::FromStr;

use race_core::CarRng;

use crate::CarError;

/// The behavior tag carried by every car profile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DriverStyle {
    Aggressive   = 0,
    Conservative = 1,
    Balanced     = 2,
    Technical    = 3,
    Chaotic      = 4,
}

/// Multiplicative factors applied to a car's static profile.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StyleModifiers {
    /// Scales top speed.
    pub speed_bonus:        f64,
    /// Divides the 0–100 time (higher is quicker).
    pub acceleration_bonus: f64,
    /// Scales handling.
    pub handling_penalty:   f64,
    /// Scales fuel efficiency (higher burns less).
    pub fuel_penalty:       f64,
    /// Scales tire wear and corner incident odds.
    pub risk_factor:        f64,
}

/// Inputs to a style's target-speed function.
#[derive(Copy, Clone, Debug)]
pub struct SpeedInputs {
    /// Segment optimal speed after weather, km/h.
    pub optimal:       f64,
    pub is_straight:   bool,
    /// The car's current effective top speed, km/h.
    pub effective_top: f64,
    pub risk_factor:   f64,
}

type TargetFn = fn(&SpeedInputs, &mut CarRng) -> f64;

struct StyleRow {
    modifiers: StyleModifiers,
    target:    TargetFn,
}

fn aggressive_target(i: &SpeedInputs, _rng: &mut CarRng) -> f64 {
    if i.is_straight {
        (i.optimal * 1.1).min(i.effective_top)
    } else {
        i.optimal * (0.95 + i.risk_factor * 0.05)
    }
}

fn conservative_target(i: &SpeedInputs, _rng: &mut CarRng) -> f64 {
    i.optimal * 0.92
}

fn balanced_target(i: &SpeedInputs, _rng: &mut CarRng) -> f64 {
    i.optimal * 1.02
}

fn technical_target(i: &SpeedInputs, _rng: &mut CarRng) -> f64 {
    if i.is_straight {
        (i.optimal * 1.05).min(i.effective_top)
    } else {
        i.optimal
    }
}

fn chaotic_target(i: &SpeedInputs, rng: &mut CarRng) -> f64 {
    i.optimal * rng.gen_range(0.85..=1.15)
}

/// Indexed by `DriverStyle as usize`.
const STYLE_TABLE: [StyleRow; 5] = [
    StyleRow {
        modifiers: StyleModifiers {
            speed_bonus:        1.05,
            acceleration_bonus: 1.08,
            handling_penalty:   0.92,
            fuel_penalty:       0.85,
            risk_factor:        1.3,
        },
        target: aggressive_target,
    },
    StyleRow {
        modifiers: StyleModifiers {
            speed_bonus:        0.95,
            acceleration_bonus: 0.92,
            handling_penalty:   1.05,
            fuel_penalty:       1.1,
            risk_factor:        0.7,
        },
        target: conservative_target,
    },
    StyleRow {
        modifiers: StyleModifiers {
            speed_bonus:        1.0,
            acceleration_bonus: 1.0,
            handling_penalty:   1.0,
            fuel_penalty:       1.0,
            risk_factor:        1.0,
        },
        target: balanced_target,
    },
    StyleRow {
        modifiers: StyleModifiers {
            speed_bonus:        0.98,
            acceleration_bonus: 0.95,
            handling_penalty:   1.12,
            fuel_penalty:       1.05,
            risk_factor:        0.8,
        },
        target: technical_target,
    },
    StyleRow {
        modifiers: StyleModifiers {
            speed_bonus:        1.02,
            acceleration_bonus: 1.05,
            handling_penalty:   0.88,
            fuel_penalty:       0.9,
            risk_factor:        1.5,
        },
        target: chaotic_target,
    },
];

impl DriverStyle {
    pub const ALL: [DriverStyle; 5] = [
        DriverStyle::Aggressive,
        DriverStyle::Conservative,
        DriverStyle::Balanced,
        DriverStyle::Technical,
        DriverStyle::Chaotic,
    ];

    #[inline]
    fn row(self) -> &'static StyleRow {
        &STYLE_TABLE[self as usize]
    }

    #[inline]
    pub fn modifiers(self) -> &'static StyleModifiers {
        &self.row().modifiers
    }

    /// Apply this style's speed choice to a segment's optimal speed.
    #[inline]
    pub fn target_speed(self, inputs: &SpeedInputs, rng: &mut CarRng) -> f64 {
        (self.row().target)(inputs, rng)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DriverStyle::Aggressive   => "aggressive",
            DriverStyle::Conservative => "conservative",
            DriverStyle::Balanced     => "balanced",
            DriverStyle::Technical    => "technical",
            DriverStyle::Chaotic      => "chaotic",
        }
    }
}

impl fmt::Display for DriverStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverStyle {
    type Err = CarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DriverStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CarError::UnknownStyle(s.to_owned()))
    }
}
