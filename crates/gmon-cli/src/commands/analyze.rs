//! Offline anomaly-pass command handler.
//!
//! Covers `gmon analyze`: one detection run over a decoded-records file.
//!
//! Prints one line per anomaly plus per-severity and per-kind tallies in
//! key=value form. A structural hard fault in the records file aborts with
//! a non-zero exit; lenient field fallbacks were already applied by the
//! normalizer and are not faults.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use gmon_anomaly::AnomalyRecord;

pub fn run(records_path: &str, config_paths: &[String]) -> Result<()> {
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let (cfg, loaded) = gmon_config::load_monitor_config(&path_refs)?;

    let raw = super::load_raw_records(records_path)?;
    let records = gmon_ingest::normalize_batch(&raw)
        .with_context(|| format!("structural fault in {records_path}"))?;

    let anomalies = gmon_anomaly::detect(&cfg.detector, &records);

    println!("config_hash={}", loaded.config_hash);
    println!("records={}", records.len());
    println!("anomalies={}", anomalies.len());

    for a in &anomalies {
        println!(
            "{} {} {} {} {}",
            a.timestamp.to_rfc3339(),
            a.severity,
            a.kind,
            a.gocb_ref,
            a.message
        );
    }

    print_tallies(&anomalies);
    Ok(())
}

fn print_tallies(anomalies: &[AnomalyRecord]) {
    let mut by_severity: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_kind: BTreeMap<&str, usize> = BTreeMap::new();
    for a in anomalies {
        *by_severity.entry(a.severity.as_str()).or_insert(0) += 1;
        *by_kind.entry(a.kind.as_str()).or_insert(0) += 1;
    }

    for (sev, n) in by_severity {
        println!("severity.{sev}={n}");
    }
    for (kind, n) in by_kind {
        println!("kind.{kind}={n}");
    }
}
