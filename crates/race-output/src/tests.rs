//! Integration tests for race-output.

use std::io;

use race_car::{CarProfile, DriverStyle, GridBuilder, Track, TrackKind};
use race_core::{CarId, RaceConfig, Tick};
use race_sim::{RaceBuilder, RaceEvent, RaceObserver, RaceResults};
use tempfile::TempDir;

use crate::*;

fn tmp() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

fn read_rows(path: &std::path::Path) -> (Vec<String>, Vec<::csv::StringRecord>) {
    let mut rdr = ::csv::Reader::from_path(path).unwrap();
    let headers = rdr.headers().unwrap().iter().map(str::to_owned).collect();
    let rows = rdr.records().map(|r| r.unwrap()).collect();
    (headers, rows)
}

fn config() -> RaceConfig {
    RaceConfig {
        tick_secs:               0.05,
        max_ticks:               20_000,
        laps:                    1,
        seed:                    3,
        snapshot_interval_ticks: 100,
    }
}

fn run_race(dir: &std::path::Path) -> (RaceResults, Option<OutputError>) {
    let profile = CarProfile::new(300.0, 4.0, 0.8, 10.0, DriverStyle::Balanced).unwrap();
    let (cars, rngs) = GridBuilder::new(3)
        .entrant("Alpha", profile)
        .entrant("Bravo", profile)
        .grid_gap(8.0)
        .build()
        .unwrap();
    let mut race = RaceBuilder::new(config(), Track::preset(TrackKind::Speed), cars, rngs)
        .build()
        .unwrap();
    let mut obs = RaceOutputObserver::new(CsvWriter::new(dir).unwrap(), &race.config);
    let results = race.run(&mut obs).unwrap();
    (results, obs.take_error())
}

/// Fails every write.
struct BrokenWriter {
    attempts: usize,
}

impl OutputWriter for BrokenWriter {
    fn write_events(&mut self, _rows: &[EventRow]) -> OutputResult<()> {
        self.attempts += 1;
        Err(io::Error::other(format!("disk full ({})", self.attempts)).into())
    }

    fn write_snapshots(&mut self, _rows: &[SnapshotRow]) -> OutputResult<()> {
        self.attempts += 1;
        Err(io::Error::other("unreachable").into())
    }

    fn write_standings(&mut self, _rows: &[StandingRow]) -> OutputResult<()> {
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod csv_tests {
    use super::*;

    #[test]
    fn csv_files_created_with_headers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let (events, _) = read_rows(&dir.path().join(crate::csv::EVENTS_FILE));
        assert_eq!(events, ["tick", "race_secs", "event", "car", "detail"]);
        let (snapshots, _) = read_rows(&dir.path().join(crate::csv::SNAPSHOTS_FILE));
        assert_eq!(snapshots[0], "tick");
        assert_eq!(snapshots.len(), 9);
        let (standings, _) = read_rows(&dir.path().join(crate::csv::STANDINGS_FILE));
        assert_eq!(standings.len(), 14);
        assert_eq!(standings[2], "name");
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tmp();
        let nested = dir.path().join("runs").join("gp1");
        let _w = CsvWriter::new(&nested).unwrap();
        assert!(nested.join(crate::csv::EVENTS_FILE).exists());
    }

    #[test]
    fn event_rows_carry_time_and_detail() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let lap = RaceEvent::LapCompleted { tick: Tick(40), car: CarId(2), lap: 1, lap_secs: 2.0 };
        let end = RaceEvent::RaceEnded { tick: Tick(41), completed: false };
        let rows = [EventRow::from_event(&lap, 0.05), EventRow::from_event(&end, 0.05)];
        w.write_events(&rows).unwrap();
        w.finish().unwrap();

        let (_, rows) = read_rows(&dir.path().join(crate::csv::EVENTS_FILE));
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "40");
        assert_eq!(&rows[0][1], "2.000");
        assert_eq!(&rows[0][2], "lap");
        assert_eq!(&rows[0][3], "2");
        assert_eq!(&rows[0][4], "lap 1 in 2.000s");
        // Race-wide events have no car.
        assert_eq!(&rows[1][3], "");
        assert_eq!(&rows[1][4], "stopped early");
    }

    #[test]
    fn finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn empty_batches_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_events(&[]).unwrap();
        w.write_snapshots(&[]).unwrap();
        w.write_standings(&[]).unwrap();
    }
}

#[cfg(test)]
mod observer_tests {
    use super::*;

    #[test]
    fn race_output_end_to_end() {
        let dir = tmp();
        let (results, error) = run_race(dir.path());
        assert!(error.is_none(), "no write errors expected: {error:?}");
        assert!(results.completed);

        let (_, events) = read_rows(&dir.path().join(crate::csv::EVENTS_FILE));
        assert_eq!(&events[0][2], "race_started");
        assert_eq!(&events[events.len() - 1][2], "race_ended");
        let finished = events.iter().filter(|r| &r[2] == "finished").count();
        assert_eq!(finished, 2);

        // Snapshots at ticks 0, 100, 200, … while the race runs, one row per car.
        let (_, snapshots) = read_rows(&dir.path().join(crate::csv::SNAPSHOTS_FILE));
        assert_eq!(snapshots.len() as u64, results.ticks.div_ceil(100) * 2);

        let (_, standings) = read_rows(&dir.path().join(crate::csv::STANDINGS_FILE));
        assert_eq!(standings.len(), 2);
        assert_eq!(&standings[0][0], "1");
        assert_eq!(&standings[0][2], results.standings[0].name.as_str());
        assert_eq!(&standings[0][4], "1");
        assert_eq!(&standings[1][0], "2");
    }

    #[test]
    fn first_error_is_kept() {
        let mut obs = RaceOutputObserver::new(BrokenWriter { attempts: 0 }, &config());
        for tick in 0..3 {
            obs.on_event(&RaceEvent::RaceEnded { tick: Tick(tick), completed: false });
            obs.flush_events();
        }
        let err = obs.take_error().unwrap();
        assert!(err.to_string().contains("disk full (1)"), "{err}");
        assert!(obs.take_error().is_none());
        assert_eq!(obs.into_writer().attempts, 3);
    }
}

#[cfg(test)]
mod json_tests {
    use super::*;

    #[test]
    fn results_json_reads_back() {
        let dir = tmp();
        let (results, _) = run_race(dir.path());
        let path = dir.path().join(RESULTS_FILE);
        write_results_json(&path, &results).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: RaceResults = serde_json::from_str(&text).unwrap();
        assert_eq!(back.standings.len(), 2);
        assert_eq!(back.winner().map(|w| w.car), results.winner().map(|w| w.car));
        assert_eq!(back.track, "Monza Speed Circuit");
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tmp();
        let (results, _) = run_race(dir.path());
        let path = dir.path().join("nope").join(RESULTS_FILE);
        assert!(matches!(write_results_json(&path, &results), Err(OutputError::Io(_))));
    }
}
