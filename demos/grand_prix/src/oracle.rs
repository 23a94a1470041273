//! A stand-in for a remote decision model: slow, sometimes down, sometimes
//! incoherent.

use std::thread;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use race_car::DriverStyle;
use race_decision::{Oracle, OracleError, OracleRequest, OracleResult};
use serde_json::{json, Value};

use crate::config::OracleSettings;

const GOLDEN: u64 = 0x9e37_79b9_7f4a_7c15;

/// Everything a chaotic driver might blurt out, aliases included.
const CHAOS_TAGS: [&str; 9] =
    ["attack", "boost", "pass", "shoot", "block", "pressure", "use_item", "save", "wait"];

/// Answers with a JSON decision wrapped in a code fence, after a delay.
///
/// Every call draws from an RNG seeded by `(seed, car, tick)`, so the reply
/// for a given request does not depend on which worker serves it.
pub struct SimulatedOracle {
    settings: OracleSettings,
    style:    DriverStyle,
    seed:     u64,
}

impl SimulatedOracle {
    pub fn new(settings: OracleSettings, style: DriverStyle, seed: u64) -> Self {
        Self { settings, style, seed }
    }

    fn rng_for(&self, request: &OracleRequest) -> SmallRng {
        let car = u64::from(request.car.0).wrapping_add(1).wrapping_mul(GOLDEN);
        SmallRng::seed_from_u64(self.seed ^ car ^ request.tick.0.rotate_left(32))
    }

    /// `(action, confidence, reasoning, use_powerup)`.
    fn think(&self, s: &Value, rng: &mut SmallRng) -> (&'static str, f64, String, bool) {
        let num = |key: &str| s[key].as_f64();
        let position = num("position").unwrap_or(1.0);
        let total = num("total_cars").unwrap_or(1.0);
        let ahead = num("gap_ahead_m").unwrap_or(f64::INFINITY);
        let behind = num("gap_behind_m").unwrap_or(f64::INFINITY);
        let fuel = num("fuel").unwrap_or(100.0);
        let wear = num("tire_wear").unwrap_or(0.0);
        let tires_gone = s["tires_critical"].as_bool() == Some(true);
        let straight = s["segment"].as_str() == Some("straight");
        let in_range = s["can_fire"].as_bool() == Some(true) && s["target_in_range"].as_bool() == Some(true);
        let has_item = s["inventory"].as_array().is_some_and(|items| !items.is_empty());
        let use_item = has_item && (position > 1.0 || behind < 40.0);

        let (action, confidence, why) = if fuel < 12.0 {
            ("conserve", 0.85, format!("only {fuel:.0}% fuel left"))
        } else if in_range {
            ("fire", 0.9, "car ahead is in range".to_owned())
        } else if straight && ahead < 50.0 {
            ("overtake", 0.8, format!("{ahead:.0} m to the car ahead on a straight"))
        } else if position == 1.0 && behind < 25.0 {
            ("block", 0.7, "leading under pressure".to_owned())
        } else if tires_gone || wear > 75.0 {
            ("hold", 0.65, format!("tires at {wear:.0}%"))
        } else {
            match self.style {
                DriverStyle::Aggressive => ("attack", 0.7, "flat out".to_owned()),
                DriverStyle::Conservative => ("conserve", 0.6, "saving the car".to_owned()),
                DriverStyle::Technical if !straight => ("pressure", 0.65, "clean line through the corner".to_owned()),
                DriverStyle::Chaotic => {
                    let tag = CHAOS_TAGS.choose(rng).copied().unwrap_or("wait");
                    (tag, rng.gen_range(0.2..1.0), "why not".to_owned())
                }
                _ if position == total => ("boost", 0.6, "nothing to lose".to_owned()),
                _ => ("pressure", 0.55, "keeping in touch".to_owned()),
            }
        };
        (action, confidence, why, use_item)
    }
}

impl Oracle for SimulatedOracle {
    fn consult(&self, request: &OracleRequest) -> OracleResult<String> {
        let mut rng = self.rng_for(request);
        let jitter = rng.gen_range(0..=self.settings.jitter_ms);
        thread::sleep(Duration::from_millis(self.settings.latency_ms + jitter));

        if rng.gen_bool(self.settings.failure_rate) {
            return Err(OracleError::Transport("connection reset by peer".into()));
        }
        if rng.gen_bool(self.settings.garbled_rate) {
            return Ok("Great question! There are many factors to weigh in racing.".into());
        }

        let situation: Value = serde_json::from_str(&request.situation)
            .map_err(|e| OracleError::Transport(format!("bad request payload: {e}")))?;
        let (action, confidence, reasoning, use_powerup) = self.think(&situation, &mut rng);
        let reply = json!({
            "action":      action,
            "confidence":  confidence,
            "reasoning":   reasoning,
            "use_powerup": use_powerup,
        });
        Ok(format!("Here is my call:\n```json\n{reply}\n```"))
    }
}
