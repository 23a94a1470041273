//! `race-output`: race output writers for the rust_race simulator.
//!
//! | Writer                 | Files created                                              |
//! |------------------------|------------------------------------------------------------|
//! | [`CsvWriter`]          | `race_events.csv`, `car_snapshots.csv`, `standings.csv`    |
//! | [`write_results_json`] | any path, conventionally `results.json`                    |
//!
//! Writers implement [`OutputWriter`] and are driven by
//! [`RaceOutputObserver`], which implements `race_sim::RaceObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use race_output::{CsvWriter, RaceOutputObserver, write_results_json};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = RaceOutputObserver::new(writer, &race.config);
//! let results = race.run(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! write_results_json(&Path::new("./output").join(RESULTS_FILE), &results)?;
//! ```

pub mod csv;
pub mod error;
pub mod json;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use self::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use json::{write_results_json, RESULTS_FILE};
pub use observer::RaceOutputObserver;
pub use row::{EventRow, SnapshotRow, StandingRow};
pub use writer::OutputWriter;
