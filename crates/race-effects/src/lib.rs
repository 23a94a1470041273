//! `race-effects`: the three subsystems that read and mutate the per-tick
//! car snapshot after the physics step.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`collision`] | `CollisionResolver`, pair cooldowns, risk levels, stats       |
//! | [`powerup`]   | `PowerUpSystem`, pickups, inventories, timed `ActiveEffect`s  |
//! | [`weapon`]    | `WeaponSystem`, per-car `Weapon`, targeting, hit markers      |
//! | [`error`]     | `EffectsError`, `EffectsResult<T>`                            |
//!
//! # Ownership
//!
//! Each system keeps its own per-car state in `Vec`s indexed by `CarId` and
//! is owned by the race loop.  Car state is only ever lent in for the length
//! of one call, so none of these types hold references across ticks.
//!
//! All positions here are *fractions of a lap*: in-lap progress in `[0, 1)`
//! for collisions and pickups, race progress (laps + fraction) for weapon
//! targeting.

pub mod collision;
pub mod error;
pub mod powerup;
pub mod weapon;

#[cfg(test)]
mod tests;

pub use collision::{
    CarPair, CollisionEvent, CollisionInput, CollisionKind, CollisionResolver, CollisionRisk,
    CollisionStats, RiskLevel,
};
pub use error::{EffectsError, EffectsResult};
pub use powerup::{
    best_item, item_value, ActiveEffect, EffectKind, ItemUse, Pickup, PowerUpKind, PowerUpSystem,
    RankTier,
};
pub use weapon::{FireOutcome, HitEvent, HitMarker, Weapon, WeaponStats, WeaponSystem};

/// Shortest distance between two in-lap progress values, wrapping at 1.0.
#[inline]
pub fn wrapped_gap(a: f64, b: f64) -> f64 {
    let d = (a - b).abs().rem_euclid(1.0);
    d.min(1.0 - d)
}
