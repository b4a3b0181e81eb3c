//! Command handlers for the gmon CLI.

use anyhow::{Context, Result};
use gmon_ingest::RawGooseRecord;
use std::fs;

pub mod analyze;
pub mod report;

/// Read a decoded-records JSON file (array of raw records).
pub(crate) fn load_raw_records(path: &str) -> Result<Vec<RawGooseRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read records file: {path}"))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("records file is not a JSON array of records: {path}"))
}
