//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `race_events.csv`
//! - `car_snapshots.csv`
//! - `standings.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{EventRow, OutputResult, SnapshotRow, StandingRow};

pub const EVENTS_FILE: &str = "race_events.csv";
pub const SNAPSHOTS_FILE: &str = "car_snapshots.csv";
pub const STANDINGS_FILE: &str = "standings.csv";

/// Writes race output to three CSV files.
pub struct CsvWriter {
    events:    Writer<File>,
    snapshots: Writer<File>,
    standings: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open the CSV files and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut events = Writer::from_path(dir.join(EVENTS_FILE))?;
        events.write_record(["tick", "race_secs", "event", "car", "detail"])?;

        let mut snapshots = Writer::from_path(dir.join(SNAPSHOTS_FILE))?;
        snapshots.write_record([
            "tick", "car", "position", "lap", "distance_m", "speed_kmh", "fuel", "tire_wear", "finished",
        ])?;

        let mut standings = Writer::from_path(dir.join(STANDINGS_FILE))?;
        standings.write_record([
            "position", "car", "name", "style", "finished", "finish_secs", "laps", "best_lap",
            "distance_m", "fuel", "tire_wear", "collisions", "shots", "hits",
        ])?;

        Ok(Self { events, snapshots, standings, finished: false })
    }
}

fn opt_secs(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_default()
}

impl OutputWriter for CsvWriter {
    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        for row in rows {
            self.events.write_record(&[
                row.tick.to_string(),
                format!("{:.3}", row.race_secs),
                row.kind.to_owned(),
                row.car.map(|c| c.to_string()).unwrap_or_default(),
                row.detail.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_snapshots(&mut self, rows: &[SnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.tick.to_string(),
                row.car.to_string(),
                row.position.to_string(),
                row.lap.to_string(),
                format!("{:.2}", row.distance_m),
                format!("{:.2}", row.speed_kmh),
                format!("{:.2}", row.fuel),
                format!("{:.2}", row.tire_wear),
                (row.finished as u8).to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_standings(&mut self, rows: &[StandingRow]) -> OutputResult<()> {
        for row in rows {
            self.standings.write_record(&[
                row.position.to_string(),
                row.car.to_string(),
                row.name.clone(),
                row.style.to_owned(),
                (row.finished as u8).to_string(),
                opt_secs(row.finish_secs),
                row.laps.to_string(),
                opt_secs(row.best_lap),
                format!("{:.2}", row.distance_m),
                format!("{:.2}", row.fuel),
                format!("{:.2}", row.tire_wear),
                row.collisions.to_string(),
                row.shots.to_string(),
                row.hits.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.events.flush()?;
        self.snapshots.flush()?;
        self.standings.flush()?;
        Ok(())
    }
}
