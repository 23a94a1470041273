//! `RaceOutputObserver<W>` bridges `RaceObserver` to an `OutputWriter`.

use race_car::Car;
use race_core::{RaceConfig, Tick};
use race_sim::{Flow, FrameView, RaceEvent, RaceObserver, RaceResults};

use crate::row::{EventRow, SnapshotRow, StandingRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`RaceObserver`] that writes the event log, car snapshots and final
/// standings to any [`OutputWriter`].
///
/// Events are buffered and written once per tick.  Errors from the writer
/// are stored because `RaceObserver` methods have no return value; after
/// `race.run()` returns, check with [`take_error`][Self::take_error].
pub struct RaceOutputObserver<W: OutputWriter> {
    writer:     W,
    tick_secs:  f64,
    pending:    Vec<EventRow>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> RaceOutputObserver<W> {
    pub fn new(writer: W, config: &RaceConfig) -> Self {
        Self {
            writer,
            tick_secs: config.tick_secs,
            pending: Vec::new(),
            last_error: None,
        }
    }

    /// The first write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    pub(crate) fn flush_events(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let result = self.writer.write_events(&self.pending);
        self.pending.clear();
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> RaceObserver for RaceOutputObserver<W> {
    fn on_event(&mut self, event: &RaceEvent) {
        self.pending.push(EventRow::from_event(event, self.tick_secs));
    }

    fn on_frame(&mut self, _frame: &FrameView<'_>) -> Flow {
        self.flush_events();
        Flow::Continue
    }

    fn on_snapshot(&mut self, tick: Tick, cars: &[Car]) {
        let rows: Vec<SnapshotRow> = cars.iter().map(|c| SnapshotRow::from_car(tick, c)).collect();
        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_race_end(&mut self, results: &RaceResults) {
        self.flush_events();
        let rows: Vec<StandingRow> = results.standings.iter().map(StandingRow::from).collect();
        let result = self.writer.write_standings(&rows);
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
