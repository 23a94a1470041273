//! The `OutputWriter` trait implemented by backend writers.

use crate::{EventRow, OutputResult, SnapshotRow, StandingRow};

/// A sink for race telemetry.
///
/// Errors surface through [`RaceOutputObserver::take_error`][crate::RaceOutputObserver::take_error]
/// when the writer is driven by an observer.
pub trait OutputWriter {
    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()>;

    fn write_snapshots(&mut self, rows: &[SnapshotRow]) -> OutputResult<()>;

    /// Final classification, leader first.
    fn write_standings(&mut self, rows: &[StandingRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
