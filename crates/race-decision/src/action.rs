//! The closed set of tactical actions.
//!
//! Each action carries a target-speed factor and a one-shot resource cost
//! paid when a car adopts a decision carrying it.  Both live in one table
//! indexed by `Action as usize`.

use std::fmt;
use std::str::FromStr;

use race_car::CarState;
use serde::{Deserialize, Serialize};

use crate::DecisionError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Attack = 0,
    Defend = 1,
    Conserve = 2,
    Pressure = 3,
    UsePowerup = 4,
    Overtake = 5,
    Block = 6,
    Boost = 7,
    Hold = 8,
    Fire = 9,
    #[default]
    Wait = 10,
}

struct ActionRow {
    name:         &'static str,
    aliases:      &'static [&'static str],
    speed_factor: f64,
    /// Fuel percentage points added on adoption (negative = spent).
    fuel:         f64,
    /// Tire wear percentage points added on adoption.
    tire_wear:    f64,
}

const ACTION_TABLE: [ActionRow; 11] = [
    ActionRow { name: "attack",      aliases: &[],              speed_factor: 1.15, fuel: -0.20, tire_wear:  0.10 },
    ActionRow { name: "defend",      aliases: &[],              speed_factor: 0.95, fuel:  0.0,  tire_wear:  0.0  },
    ActionRow { name: "conserve",    aliases: &[],              speed_factor: 0.85, fuel:  0.05, tire_wear: -0.02 },
    ActionRow { name: "pressure",    aliases: &[],              speed_factor: 1.05, fuel: -0.05, tire_wear:  0.0  },
    ActionRow { name: "use_powerup", aliases: &["use_item"],    speed_factor: 1.02, fuel:  0.0,  tire_wear:  0.0  },
    ActionRow { name: "overtake",    aliases: &["pass"],        speed_factor: 1.20, fuel: -0.25, tire_wear:  0.15 },
    ActionRow { name: "block",       aliases: &[],              speed_factor: 0.90, fuel:  0.0,  tire_wear:  0.0  },
    ActionRow { name: "boost",       aliases: &[],              speed_factor: 1.25, fuel: -0.30, tire_wear:  0.0  },
    ActionRow { name: "hold",        aliases: &["save"],        speed_factor: 0.80, fuel:  0.10, tire_wear:  0.0  },
    ActionRow { name: "fire",        aliases: &["shoot"],       speed_factor: 0.95, fuel:  0.0,  tire_wear:  0.0  },
    ActionRow { name: "wait",        aliases: &[],              speed_factor: 0.98, fuel:  0.0,  tire_wear:  0.0  },
];

impl Action {
    pub const ALL: [Action; 11] = [
        Action::Attack,
        Action::Defend,
        Action::Conserve,
        Action::Pressure,
        Action::UsePowerup,
        Action::Overtake,
        Action::Block,
        Action::Boost,
        Action::Hold,
        Action::Fire,
        Action::Wait,
    ];

    #[inline]
    fn row(self) -> &'static ActionRow {
        &ACTION_TABLE[self as usize]
    }

    /// Match a free-form tag: case, surrounding space, and `-`/space versus
    /// `_` are ignored, and aliases (`pass`, `save`, `shoot`) are accepted.
    pub fn from_tag(tag: &str) -> Option<Action> {
        let tag = tag.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Action::ALL
            .into_iter()
            .find(|a| a.row().name == tag || a.row().aliases.contains(&tag.as_str()))
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        self.row().name
    }

    /// Multiplier on the car's target speed while this action is in effect.
    #[inline]
    pub fn speed_factor(self) -> f64 {
        self.row().speed_factor
    }

    /// Pay this action's one-shot fuel and tire cost.
    pub fn apply_side_effects(self, state: &mut CarState) {
        let row = self.row();
        if row.fuel != 0.0 {
            state.adjust_fuel(row.fuel);
        }
        if row.tire_wear != 0.0 {
            state.adjust_tire_wear(row.tire_wear);
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = DecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::from_tag(s).ok_or_else(|| DecisionError::UnknownAction(s.to_owned()))
    }
}
