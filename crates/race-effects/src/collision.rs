//! Proximity collisions between pairs of cars.
//!
//! Each tick the race loop hands [`CollisionResolver::detect`] one
//! [`CollisionInput`] row per active car.  Every unordered pair closer than
//! [`COLLISION_THRESHOLD`] that is not cooling down gets one roll:
//!
//! ```text
//! p = (0.1 + min(|Δv| / 50, 0.3)) × section multiplier
//! ```
//!
//! A hit starts a [`COOLDOWN_TICKS`] cooldown for that pair.

use std::fmt;

use log::{debug, warn};
use race_car::SectionKind;
use race_core::{CarId, RaceRng};
use rustc_hash::FxHashMap;

use crate::{wrapped_gap, EffectsError, EffectsResult};

/// In-lap progress difference below which two cars can touch (≈ 2 car lengths).
pub const COLLISION_THRESHOLD: f64 = 0.002;
/// Ticks a pair is ignored after touching.
pub const COOLDOWN_TICKS: u32 = 5;
/// Progress window considered by [`CollisionResolver::collision_risk`].
pub const RISK_RADIUS: f64 = 0.01;

const BASE_PROBABILITY: f64 = 0.1;
const MAX_SPEED_TERM: f64 = 0.3;
const REAR_END_DELTA_KMH: f64 = 20.0;
const SEVERITY_RANGE: (f64, f64) = (0.2, 0.8);

fn section_multiplier(section: SectionKind) -> f64 {
    match section {
        SectionKind::Straight   => 0.5,
        SectionKind::LongCorner => 1.2,
        SectionKind::Corner     => 1.5,
        SectionKind::Chicane    => 2.0,
    }
}

// ── Types ─────────────────────────────────────────────────────────────────────

/// Unordered pair of cars; the smaller id is always first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CarPair(CarId, CarId);

impl CarPair {
    pub fn new(a: CarId, b: CarId) -> Self {
        if a <= b { CarPair(a, b) } else { CarPair(b, a) }
    }

    #[inline]
    pub fn cars(self) -> (CarId, CarId) {
        (self.0, self.1)
    }
}

/// One car's row for a collision pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollisionInput {
    pub car:       CarId,
    /// In-lap progress, `[0, 1)`.
    pub progress:  f64,
    /// km/h.
    pub speed:     f64,
    pub section:   SectionKind,
    /// Shielded cars still collide but take no speed loss.
    pub protected: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CollisionKind {
    CornerClash,
    RearEnd,
    SideSwipe,
}

impl CollisionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CollisionKind::CornerClash => "corner_clash",
            CollisionKind::RearEnd     => "rear_end",
            CollisionKind::SideSwipe   => "side_swipe",
        }
    }
}

impl fmt::Display for CollisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CollisionEvent {
    /// The faster car of the pair.
    pub at_fault:           CarId,
    pub victim:             CarId,
    pub kind:               CollisionKind,
    pub section:            SectionKind,
    /// Uniform in `[0.2, 0.8]`.
    pub severity:           f64,
    /// Time-penalty equivalents, seconds.  Advisory; speed loss is applied by
    /// [`CollisionResolver::apply`].
    pub at_fault_penalty:   f64,
    pub victim_penalty:     f64,
    pub at_fault_protected: bool,
    pub victim_protected:   bool,
}

impl CollisionEvent {
    /// Speed multiplier for the at-fault car.
    #[inline]
    pub fn at_fault_factor(&self) -> f64 {
        1.0 - self.severity * 0.3
    }

    /// Speed multiplier for the other car.
    #[inline]
    pub fn victim_factor(&self) -> f64 {
        1.0 - self.severity * 0.2
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RiskLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    fn from_factor(factor: f64) -> Self {
        if factor > 0.7 {
            RiskLevel::High
        } else if factor > 0.4 {
            RiskLevel::Medium
        } else if factor > 0.1 {
            RiskLevel::Low
        } else {
            RiskLevel::None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::None   => "none",
            RiskLevel::Low    => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High   => "high",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionRisk {
    pub level:  RiskLevel,
    /// Summed per-neighbour risk, capped at 1.
    pub factor: f64,
    pub nearby: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionStats {
    pub total:    u32,
    pub at_fault: u32,
    pub victim:   u32,
}

// ── CollisionResolver ─────────────────────────────────────────────────────────

pub struct CollisionResolver {
    cooldowns:      FxHashMap<CarPair, u32>,
    stats:          Vec<CollisionStats>,
    cooldown_ticks: u32,
    total:          u64,
}

impl CollisionResolver {
    pub fn new(car_count: usize) -> Self {
        Self {
            cooldowns:      FxHashMap::default(),
            stats:          vec![CollisionStats::default(); car_count],
            cooldown_ticks: COOLDOWN_TICKS,
            total:          0,
        }
    }

    pub fn with_cooldown_ticks(mut self, ticks: u32) -> Self {
        self.cooldown_ticks = ticks;
        self
    }

    fn check(&self, car: CarId) -> EffectsResult<()> {
        if car.index() < self.stats.len() {
            Ok(())
        } else {
            Err(EffectsError::UnknownCar(car))
        }
    }

    /// True while `pair` is cooling down.
    #[inline]
    pub fn in_cooldown(&self, pair: CarPair) -> bool {
        self.cooldowns.contains_key(&pair)
    }

    /// Roll every eligible pair once.
    ///
    /// Rows naming an unknown car are left out; the remaining pairs are
    /// rolled as if the row were absent.
    pub fn detect(&mut self, rows: &[CollisionInput], rng: &mut RaceRng) -> Vec<CollisionEvent> {
        let cars: Vec<&CollisionInput> = rows
            .iter()
            .filter(|row| match self.check(row.car) {
                Ok(()) => true,
                Err(e) => {
                    warn!("{e}; left out of the collision pass");
                    false
                }
            })
            .collect();

        let mut events = Vec::new();
        for (i, &a) in cars.iter().enumerate() {
            for &b in &cars[i + 1..] {
                if a.car == b.car || wrapped_gap(a.progress, b.progress) > COLLISION_THRESHOLD {
                    continue;
                }
                let pair = CarPair::new(a.car, b.car);
                if self.in_cooldown(pair) {
                    continue;
                }

                let delta_v = (a.speed - b.speed).abs();
                let section = a.section.max(b.section);
                let p = (BASE_PROBABILITY + (delta_v / 50.0).min(MAX_SPEED_TERM))
                    * section_multiplier(section);
                if rng.random::<f64>() >= p {
                    continue;
                }

                let severity = rng.gen_range(SEVERITY_RANGE.0..=SEVERITY_RANGE.1);
                let kind = if matches!(section, SectionKind::Corner | SectionKind::Chicane) {
                    CollisionKind::CornerClash
                } else if delta_v > REAR_END_DELTA_KMH {
                    CollisionKind::RearEnd
                } else {
                    CollisionKind::SideSwipe
                };
                let (fault, other) = if a.speed > b.speed { (a, b) } else { (b, a) };
                let base_penalty = severity * 2.0;

                let event = CollisionEvent {
                    at_fault:           fault.car,
                    victim:             other.car,
                    kind,
                    section,
                    severity,
                    at_fault_penalty:   base_penalty * 1.5,
                    victim_penalty:     base_penalty * 0.7,
                    at_fault_protected: fault.protected,
                    victim_protected:   other.protected,
                };
                debug!(
                    "collision {} between {} (at fault) and {} in {}, severity {:.2}",
                    kind, fault.car, other.car, section, severity
                );

                self.cooldowns.insert(pair, self.cooldown_ticks);
                self.record(&event);
                events.push(event);
            }
        }
        events
    }

    fn record(&mut self, event: &CollisionEvent) {
        self.total += 1;
        let fault = &mut self.stats[event.at_fault.index()];
        fault.total += 1;
        fault.at_fault += 1;
        let victim = &mut self.stats[event.victim.index()];
        victim.total += 1;
        victim.victim += 1;
    }

    /// Multiply the involved cars' speeds by the event's factors, skipping
    /// protected cars.  `speeds` is indexed by `CarId`.
    pub fn apply(&self, event: &CollisionEvent, speeds: &mut [f64]) -> EffectsResult<()> {
        let hits = [
            (event.at_fault, event.at_fault_protected, event.at_fault_factor()),
            (event.victim,   event.victim_protected,   event.victim_factor()),
        ];
        for (car, protected, factor) in hits {
            let speed = speeds.get_mut(car.index()).ok_or(EffectsError::UnknownCar(car))?;
            if !protected {
                *speed = (*speed * factor).max(0.0);
            }
        }
        Ok(())
    }

    /// Count every cooldown down by one tick and drop the expired ones.
    pub fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, left| {
            *left = left.saturating_sub(1);
            *left > 0
        });
    }

    /// How exposed `car` is to contact given everyone within [`RISK_RADIUS`].
    pub fn collision_risk(
        &self,
        car:  CarId,
        cars: &[CollisionInput],
    ) -> EffectsResult<CollisionRisk> {
        let me = cars
            .iter()
            .find(|row| row.car == car)
            .ok_or(EffectsError::UnknownCar(car))?;

        let mut total = 0.0;
        let mut nearby = 0;
        for other in cars.iter().filter(|row| row.car != car) {
            let gap = wrapped_gap(me.progress, other.progress);
            if gap >= RISK_RADIUS {
                continue;
            }
            nearby += 1;
            let distance_risk = (RISK_RADIUS - gap) / RISK_RADIUS;
            let speed_risk = ((me.speed - other.speed).abs() / 50.0).min(1.0);
            total += (distance_risk + speed_risk) / 2.0;
        }

        let factor = total.min(1.0);
        Ok(CollisionRisk { level: RiskLevel::from_factor(factor), factor, nearby })
    }

    pub fn stats(&self, car: CarId) -> EffectsResult<CollisionStats> {
        self.check(car)?;
        Ok(self.stats[car.index()])
    }

    /// Collisions recorded since construction.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }
}
