//! Demo configuration: a JSON file on top of built-in defaults.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use race_car::{CarProfile, DriverStyle, TrackKind, Weather};
use race_core::RaceConfig;
use race_decision::SchedulerConfig;
use serde::Deserialize;

/// Who makes a car's decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    /// The built-in rule table, answered inline.
    Rules,
    /// The simulated remote oracle.
    #[default]
    Oracle,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entrant {
    pub name:    String,
    #[serde(flatten)]
    pub profile: CarProfile,
    #[serde(default)]
    pub driver:  Driver,
}

/// Behaviour of the simulated oracle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    pub latency_ms:   u64,
    /// Extra uniform delay on top of `latency_ms`.
    pub jitter_ms:    u64,
    /// Probability a call fails outright.
    pub failure_rate: f64,
    /// Probability a call answers with prose and no JSON.
    pub garbled_rate: f64,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self { latency_ms: 120, jitter_ms: 80, failure_rate: 0.05, garbled_rate: 0.05 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub race:       RaceConfig,
    pub scheduler:  SchedulerConfig,
    pub track:      TrackKind,
    pub weather:    Weather,
    pub grid_gap_m: f64,
    pub oracle:     OracleSettings,
    pub entrants:   Vec<Entrant>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            race:       RaceConfig::default(),
            scheduler:  SchedulerConfig::default(),
            track:      TrackKind::Mixed,
            weather:    Weather::Clear,
            grid_gap_m: 10.0,
            oracle:     OracleSettings::default(),
            entrants:   default_entrants(),
        }
    }
}

/// The five-car field.
fn default_entrants() -> Vec<Entrant> {
    let entrant = |name: &str, top, accel, handling, eff, style| Entrant {
        name:    name.to_owned(),
        profile: CarProfile {
            top_speed_kmh:       top,
            acceleration_secs:   accel,
            handling,
            fuel_efficiency_kml: eff,
            style,
        },
        driver:  Driver::Oracle,
    };
    vec![
        entrant("Llama Speed",     385.0, 3.0,  0.65, 9.0,  DriverStyle::Aggressive),
        entrant("Llama Strategic", 355.0, 2.7,  0.88, 16.0, DriverStyle::Balanced),
        entrant("Llama Balanced",  365.0, 2.85, 0.78, 13.0, DriverStyle::Balanced),
        entrant("Hermes Chaos",    375.0, 2.95, 0.68, 11.0, DriverStyle::Chaotic),
        entrant("Qwen Technical",  360.0, 2.75, 0.92, 14.0, DriverStyle::Technical),
    ]
}

impl DemoConfig {
    /// Defaults, or `path` parsed over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Profiles are validated later, when the grid is built.
    pub fn validate(&self) -> Result<()> {
        self.race.validate()?;
        self.scheduler.validate()?;
        if self.entrants.is_empty() {
            bail!("no entrants configured");
        }
        let rates = [("failure_rate", self.oracle.failure_rate), ("garbled_rate", self.oracle.garbled_rate)];
        for (name, rate) in rates {
            if !(0.0..=1.0).contains(&rate) {
                bail!("oracle {name} must be in [0, 1], got {rate}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DemoConfig::default();
        config.validate().unwrap();
        assert_eq!(config.entrants.len(), 5);
        assert!(config.entrants.iter().all(|e| e.profile.validate().is_ok()));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: DemoConfig = serde_json::from_str(
            r#"{
                "race": { "laps": 2, "seed": 9 },
                "track": "technical",
                "weather": "rain",
                "oracle": { "failure_rate": 0.5 },
                "entrants": [
                    { "name": "Solo", "top_speed_kmh": 300, "acceleration_secs": 4,
                      "handling": 0.8, "fuel_efficiency_kml": 10, "style": "conservative",
                      "driver": "rules" }
                ]
            }"#,
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.race.laps, 2);
        assert_eq!(config.race.tick_secs, RaceConfig::default().tick_secs);
        assert_eq!(config.track, TrackKind::Technical);
        assert_eq!(config.weather, Weather::Rain);
        assert_eq!(config.oracle.latency_ms, 120);
        assert_eq!(config.entrants[0].driver, Driver::Rules);
        assert_eq!(config.entrants[0].profile.style, DriverStyle::Conservative);
    }

    #[test]
    fn rejects_bad_rates() {
        let mut config = DemoConfig::default();
        config.oracle.garbled_rate = 1.5;
        assert!(config.validate().is_err());
    }
}
