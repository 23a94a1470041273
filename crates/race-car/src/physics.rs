//! The physics step.
//!
//! ```text
//! optimal   = segment geometry × weather            (optimal_speed)
//! target    = style(optimal) × action × effects     (target_speed)
//!             capped at top speed, and at 150 km/h on a near-empty tank
//! advance   = rate-limited approach to target, then distance, fuel, tires
//! tires     = km × 0.1 % × corner stress × style risk × weather
//! ```
//!
//! Nothing here fails: non-finite inputs collapse to zero and every output
//! passes through `CarState`'s clamping setters.

use race_core::CarRng;

use crate::style::SpeedInputs;
use crate::{Car, CarState, Segment, Weather};

/// Below this fuel percentage the car is speed-limited.
pub const LOW_FUEL_THRESHOLD: f64 = 5.0;
/// Speed limit on a near-empty tank, km/h.
pub const LOW_FUEL_SPEED_CAP_KMH: f64 = 150.0;

const BRAKING_RATIO: f64 = 1.5;
const TANK_LITRES: f64 = 60.0;
const CORNER_FUEL_FACTOR: f64 = 1.3;
const CORNER_TIRE_STRESS: f64 = 2.0;
/// Tire wear percentage per kilometre at unit stress.
const TIRE_WEAR_PER_KM: f64 = 0.1;
/// Base spin-out odds per tick for a style one unit over neutral risk.
const INCIDENT_BASE: f64 = 0.001;

/// Multipliers the race loop layers over the driver's style.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedRequest {
    /// From the car's current tactical decision.
    pub action_factor: f64,
    /// Product of active power-up effects.
    pub effect_factor: f64,
}

impl Default for SpeedRequest {
    fn default() -> Self {
        Self { action_factor: 1.0, effect_factor: 1.0 }
    }
}

/// Segment optimal speed for this car under `weather`, km/h.
pub fn optimal_speed(car: &Car, segment: &Segment, weather: Weather) -> f64 {
    let fx = weather.effects();
    segment.optimal_speed(car.effective_handling() * fx.handling) * fx.speed
}

#[inline]
pub fn is_low_fuel(state: &CarState) -> bool {
    state.fuel() < LOW_FUEL_THRESHOLD
}

/// The speed the car aims for this tick, km/h.
pub fn target_speed(
    car:     &Car,
    segment: &Segment,
    weather: Weather,
    request: SpeedRequest,
    rng:     &mut CarRng,
) -> f64 {
    let style = car.style();
    let effective_top = car.effective_top_speed();
    let inputs = SpeedInputs {
        optimal:       optimal_speed(car, segment, weather),
        is_straight:   segment.is_straight(),
        effective_top,
        risk_factor:   style.modifiers().risk_factor,
    };

    let boost = request.action_factor * request.effect_factor;
    let mut target = style.target_speed(&inputs, rng) * boost;

    // Boosts may push past top speed by their own factor, never further.
    target = target.min(effective_top * boost.max(1.0));
    if is_low_fuel(&car.state) {
        target = target.min(LOW_FUEL_SPEED_CAP_KMH);
    }
    if target.is_finite() { target.max(0.0) } else { 0.0 }
}

/// Tire wear, percentage points, from driving `km` on `segment` under `weather`.
pub fn tire_wear_over(car: &Car, segment: &Segment, weather: Weather, km: f64) -> f64 {
    let stress = if segment.is_straight() { 1.0 } else { CORNER_TIRE_STRESS };
    km * TIRE_WEAR_PER_KM * stress * car.style().modifiers().risk_factor * weather.effects().tire_wear
}

/// Advance one car by `dt` seconds toward `target_speed` on `segment`.
///
/// Returns the updated state; `car` itself is untouched.
pub fn advance(car: &Car, segment: &Segment, weather: Weather, target_speed: f64, dt: f64) -> CarState {
    let mut next = car.state;
    if !(dt.is_finite() && dt > 0.0) {
        return next;
    }

    // ── Speed ─────────────────────────────────────────────────────────────
    let previous = next.speed();
    let target = if target_speed.is_finite() { target_speed.max(0.0) } else { 0.0 };
    let max_change = 100.0 / car.effective_acceleration() * dt;
    let diff = target - previous;
    let change = if diff > 0.0 {
        diff.min(max_change)
    } else {
        diff.max(-max_change * BRAKING_RATIO)
    };
    next.set_speed(previous + change);

    // ── Distance (trapezoidal) ────────────────────────────────────────────
    let metres = (previous + next.speed()) / 2.0 / 3.6 * dt;
    next.travel(metres);

    // ── Resources ─────────────────────────────────────────────────────────
    let km = metres / 1000.0;
    let m = car.style().modifiers();
    let fuel_factor = if segment.is_straight() { 1.0 } else { CORNER_FUEL_FACTOR };
    let litres = km / (car.profile.fuel_efficiency_kml * m.fuel_penalty) * fuel_factor;
    next.adjust_fuel(-(litres / TANK_LITRES) * 100.0);
    next.adjust_tire_wear(tire_wear_over(car, segment, weather, km));

    next
}

/// Roll for a corner spin-out.  Styles at or below neutral risk never spin.
pub fn roll_incident(car: &Car, segment: &Segment, weather: Weather, rng: &mut CarRng) -> bool {
    if segment.is_straight() {
        return false;
    }
    let risk = car.style().modifiers().risk_factor;
    let grip_left = (100.0 - car.state.tire_wear()) / 100.0;
    let mut chance = (risk - 1.0) * INCIDENT_BASE * grip_left * weather.effects().risk;
    if chance <= 0.0 {
        return false;
    }
    if car.state.speed() > optimal_speed(car, segment, weather) * 1.2 {
        chance *= 3.0;
    }
    rng.gen_bool(chance)
}
