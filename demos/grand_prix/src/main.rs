//! grand_prix: a five-car race driven by a simulated remote oracle.
//!
//! Each car asks a slow, occasionally failing decision service what to do
//! next while the race keeps ticking.  Late or broken answers fall back to
//! `wait`; nothing the oracle does can stall the race loop.
//!
//! ```text
//! RUST_LOG=info cargo run --release -p grand-prix -- --laps 3 --realtime 20
//! ```

mod commentary;
mod config;
mod oracle;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::Parser;
use log::info;

use race_car::{GridBuilder, Track, TrackKind, Weather};
use race_decision::{DecisionProvider, TacticalRules};
use race_output::{write_results_json, CsvWriter, RaceOutputObserver, RESULTS_FILE};
use race_sim::{RaceBuilder, RaceResults};

use commentary::Commentary;
use config::{DemoConfig, Driver};
use oracle::SimulatedOracle;

#[derive(Debug, Parser)]
#[clap(name = "grand_prix", about = "Race simulation with asynchronous oracle drivers")]
struct Cli {
    /// JSON config file; missing keys keep their defaults
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(short, long)]
    laps: Option<u32>,

    #[clap(short, long)]
    seed: Option<u64>,

    /// speed, technical, mixed or endurance
    #[clap(short, long)]
    track: Option<TrackKind>,

    /// clear, rain, fog or hot
    #[clap(short, long)]
    weather: Option<Weather>,

    /// Drive every car with the rule table instead of the oracle
    #[clap(long)]
    rules: bool,

    /// Race seconds per wall-clock second; 0 runs as fast as possible
    #[clap(short, long, default_value = "20")]
    realtime: f64,

    /// Directory for the CSV logs and results.json
    #[clap(short, long, default_value = "output/grand_prix")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    // 1. Config: file, then command-line overrides.
    let mut config = DemoConfig::load(cli.config.as_deref())?;
    if let Some(laps) = cli.laps {
        config.race.laps = laps;
    }
    if let Some(seed) = cli.seed {
        config.race.seed = seed;
    }
    if let Some(track) = cli.track {
        config.track = track;
    }
    if let Some(weather) = cli.weather {
        config.weather = weather;
    }
    if cli.rules {
        config.entrants.iter_mut().for_each(|e| e.driver = Driver::Rules);
    }
    config.validate()?;
    if !(cli.realtime.is_finite() && cli.realtime >= 0.0) {
        bail!("--realtime must be a non-negative number, got {}", cli.realtime);
    }

    // 2. Grid and decision providers.
    let grid = config
        .entrants
        .iter()
        .fold(GridBuilder::new(config.race.seed).grid_gap(config.grid_gap_m), |b, e| {
            b.entrant(e.name.clone(), e.profile)
        });
    let (cars, rngs) = grid.build()?;
    let providers = config
        .entrants
        .iter()
        .map(|e| match e.driver {
            Driver::Rules => DecisionProvider::rules(TacticalRules),
            Driver::Oracle => DecisionProvider::oracle(SimulatedOracle::new(
                config.oracle.clone(),
                e.profile.style,
                config.race.seed,
            )),
        })
        .collect();

    let track = Track::preset(config.track).with_weather(config.weather);
    println!("=== grand_prix ===");
    println!(
        "{} laps  |  seed {}  |  oracle latency {}+{} ms, {:.0}% failures",
        config.race.laps,
        config.race.seed,
        config.oracle.latency_ms,
        config.oracle.jitter_ms,
        config.oracle.failure_rate * 100.0,
    );

    let mut race = RaceBuilder::new(config.race.clone(), track, cars, rngs)
        .scheduler(config.scheduler.clone())
        .providers(providers)
        .build()?;

    // 3. Output.
    fs::create_dir_all(&cli.output)?;
    let writer = CsvWriter::new(&cli.output)?;
    let mut obs = Commentary::new(RaceOutputObserver::new(writer, &race.config), cli.realtime);

    // 4. Run.
    let t0 = Instant::now();
    let results = race.run(&mut obs)?;
    let elapsed = t0.elapsed();
    info!("race loop finished in {:.3} s", elapsed.as_secs_f64());

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }
    let json_path = cli.output.join(RESULTS_FILE);
    write_results_json(&json_path, &results)?;

    // 5. Summary.
    println!();
    print_classification(&results);
    println!();
    println!("Simulated {:.1} s in {:.3} s wall clock", results.race_secs, elapsed.as_secs_f64());
    println!(
        "Decisions: {} oracle requests, {} replies, {} timeouts, {} saturated, {} fallbacks",
        results.decisions.requests,
        results.decisions.replies,
        results.decisions.timeouts,
        results.decisions.saturated,
        results.decisions.fallbacks,
    );
    println!("Events logged: {}  |  results: {}", obs.events, json_path.display());

    Ok(())
}

fn print_classification(results: &RaceResults) {
    println!(
        "{:<4} {:<16} {:<13} {:>10} {:>10} {:>6} {:>6} {:>5}",
        "Pos", "Car", "Style", "Time", "Best lap", "Fuel", "Tires", "Hits"
    );
    println!("{}", "-".repeat(76));
    for line in &results.standings {
        let time = line.finish_secs.map_or_else(|| format!("{} laps", line.laps_completed), |s| format!("{s:.3}"));
        let best = line.best_lap.map_or_else(|| "-".to_owned(), |s| format!("{s:.3}"));
        println!(
            "{:<4} {:<16} {:<13} {:>10} {:>10} {:>5.1}% {:>5.1}% {:>5}",
            line.position,
            line.name,
            line.style.as_str(),
            time,
            best,
            line.fuel,
            line.tire_wear,
            line.weapon.hits,
        );
    }
    if let Some(fl) = &results.fastest_lap {
        println!("Fastest lap: {} on lap {} ({:.3}s)", fl.name, fl.lap, fl.secs);
    }
    if !results.completed {
        println!("(race stopped before every car finished)");
    }
}
