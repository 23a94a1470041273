//! Cooldown-gated machine guns.
//!
//! Firing is three steps, all driven by the race loop:
//!
//! 1. [`WeaponSystem::attempt_fire`] spends a round if the gun is ready;
//! 2. [`WeaponSystem::find_target_ahead`] picks the nearest car strictly
//!    ahead by race progress (laps + in-lap fraction);
//! 3. [`WeaponSystem::check_hit`] decides hit or out-of-range and records a
//!    cosmetic [`HitMarker`] on a hit.
//!
//! The speed loss itself is [`Weapon::apply_hit`].

use log::debug;
use race_core::CarId;

use crate::{EffectsError, EffectsResult};

pub const AMMO: u32 = 50;
pub const FIRE_INTERVAL_SECS: f64 = 0.2;
/// Fraction of speed removed per hit.
pub const DAMAGE: f64 = 0.15;
/// Maximum hit distance, fraction of a lap.
pub const RANGE: f64 = 0.03;
/// Targets further than this are not considered at all.
pub const SEARCH_LIMIT: f64 = 0.1;
/// Hits never slow a car below this, km/h.
pub const MIN_SPEED_AFTER_HIT: f64 = 10.0;
pub const MARKER_SECS: f64 = 0.5;

/// Tolerance on the range check; race progress is a quotient of metres.
const RANGE_EPSILON: f64 = 1e-9;
/// Tolerance on the fire interval; race time is a sum of tick lengths.
const TIME_EPSILON: f64 = 1e-9;

// ── Weapon ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Weapon {
    ammo:               u32,
    fire_interval_secs: f64,
    last_fire_secs:     Option<f64>,
    damage:             f64,
    range:              f64,
}

impl Weapon {
    pub fn machine_gun() -> Self {
        Self {
            ammo:               AMMO,
            fire_interval_secs: FIRE_INTERVAL_SECS,
            last_fire_secs:     None,
            damage:             DAMAGE,
            range:              RANGE,
        }
    }

    #[inline] pub fn ammo(&self) -> u32 { self.ammo }
    #[inline] pub fn range(&self) -> f64 { self.range }
    #[inline] pub fn damage(&self) -> f64 { self.damage }

    /// Loaded and off cooldown at `now` (race seconds).
    pub fn can_fire(&self, now: f64) -> bool {
        self.ammo > 0
            && self
                .last_fire_secs
                .is_none_or(|last| now - last >= self.fire_interval_secs - TIME_EPSILON)
    }

    fn fire(&mut self, now: f64) -> bool {
        if !self.can_fire(now) {
            return false;
        }
        self.ammo -= 1;
        self.last_fire_secs = Some(now);
        true
    }

    #[inline]
    pub fn in_range(&self, distance: f64) -> bool {
        distance <= self.range + RANGE_EPSILON
    }

    /// Speed after one hit: reduced by the damage fraction, floored at
    /// [`MIN_SPEED_AFTER_HIT`] but never raised.
    pub fn apply_hit(&self, speed: f64) -> f64 {
        (speed * (1.0 - self.damage)).max(MIN_SPEED_AFTER_HIT.min(speed))
    }
}

// ── Events ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct HitEvent {
    pub shooter:  CarId,
    pub target:   CarId,
    /// Fraction of a lap.
    pub distance: f64,
    pub damage:   f64,
    /// The target was protected and took no speed loss.
    pub absorbed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FireOutcome {
    Hit(HitEvent),
    /// A round was spent but nothing was close enough.
    NoTargetInRange,
}

/// A recent hit, for renderers only.
#[derive(Clone, Debug, PartialEq)]
pub struct HitMarker {
    pub shooter:  CarId,
    pub target:   CarId,
    pub age_secs: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponStats {
    pub shots: u32,
    pub hits:  u32,
}

// ── WeaponSystem ──────────────────────────────────────────────────────────────

pub struct WeaponSystem {
    weapons: Vec<Weapon>,
    stats:   Vec<WeaponStats>,
    markers: Vec<HitMarker>,
}

impl WeaponSystem {
    /// One fresh machine gun per car.
    pub fn new(car_count: usize) -> Self {
        Self {
            weapons: vec![Weapon::machine_gun(); car_count],
            stats:   vec![WeaponStats::default(); car_count],
            markers: Vec::new(),
        }
    }

    pub fn weapon(&self, car: CarId) -> EffectsResult<&Weapon> {
        self.weapons.get(car.index()).ok_or(EffectsError::UnknownCar(car))
    }

    pub fn stats(&self, car: CarId) -> EffectsResult<WeaponStats> {
        self.stats.get(car.index()).copied().ok_or(EffectsError::UnknownCar(car))
    }

    #[inline]
    pub fn markers(&self) -> &[HitMarker] {
        &self.markers
    }

    /// Spend one round if `car`'s gun is ready at `now`.
    pub fn attempt_fire(&mut self, car: CarId, now: f64) -> EffectsResult<bool> {
        let weapon = self.weapons.get_mut(car.index()).ok_or(EffectsError::UnknownCar(car))?;
        let fired = weapon.fire(now);
        if fired {
            self.stats[car.index()].shots += 1;
        }
        Ok(fired)
    }

    /// Nearest car strictly ahead of `car` within [`SEARCH_LIMIT`].
    ///
    /// `positions` holds race progress (laps + in-lap fraction) per car, so a
    /// car a lap up is a lap further away, not just ahead.
    pub fn find_target_ahead(
        &self,
        car:       CarId,
        positions: &[(CarId, f64)],
    ) -> EffectsResult<Option<(CarId, f64)>> {
        let &(_, mine) = positions
            .iter()
            .find(|(c, _)| *c == car)
            .ok_or(EffectsError::UnknownCar(car))?;

        Ok(positions
            .iter()
            .filter(|(c, _)| *c != car)
            .map(|&(c, p)| (c, p - mine))
            .filter(|&(_, d)| d > 0.0 && d < SEARCH_LIMIT)
            .min_by(|a, b| a.1.total_cmp(&b.1)))
    }

    /// Resolve a spent round against `target` (car, distance ahead).
    pub fn check_hit(
        &mut self,
        shooter:          CarId,
        target:           Option<(CarId, f64)>,
        target_protected: bool,
    ) -> EffectsResult<FireOutcome> {
        let weapon = self.weapon(shooter)?;
        let Some((target, distance)) = target.filter(|&(_, d)| weapon.in_range(d)) else {
            debug!("{shooter} fired with no target in range");
            return Ok(FireOutcome::NoTargetInRange);
        };

        let event = HitEvent {
            shooter,
            target,
            distance,
            damage:   weapon.damage(),
            absorbed: target_protected,
        };
        self.stats[shooter.index()].hits += 1;
        self.markers.push(HitMarker { shooter, target, age_secs: 0.0 });
        debug!("{shooter} hit {target} at {distance:.4} (absorbed: {target_protected})");
        Ok(FireOutcome::Hit(event))
    }

    /// Age hit markers by `dt` seconds and drop expired ones.
    pub fn tick(&mut self, dt: f64) {
        self.markers.retain_mut(|m| {
            m.age_secs += dt;
            m.age_secs < MARKER_SECS
        });
    }
}
