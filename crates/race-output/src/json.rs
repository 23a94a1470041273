//! JSON export of [`RaceResults`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use race_sim::RaceResults;

use crate::OutputResult;

pub const RESULTS_FILE: &str = "results.json";

/// Write `results` to `path` as pretty-printed JSON.
pub fn write_results_json(path: &Path, results: &RaceResults) -> OutputResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, results)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
