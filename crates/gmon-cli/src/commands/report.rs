//! Offline link-report command handler.
//!
//! Covers `gmon report`: the full link report for a capture file, as JSON.

use anyhow::{Context, Result};
use chrono::Utc;
use gmon_stream::StreamTable;

/// The report clock is the last record's timestamp, so an offline capture
/// reads as of its own end rather than as of the invocation.
pub fn run(records_path: &str, links_path: Option<&str>, config_paths: &[String]) -> Result<()> {
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let (cfg, _loaded) = gmon_config::load_monitor_config(&path_refs)?;

    let raw = super::load_raw_records(records_path)?;
    let records = gmon_ingest::normalize_batch(&raw)
        .with_context(|| format!("structural fault in {records_path}"))?;

    let configured = match links_path.or(cfg.monitor.links_file.as_deref()) {
        Some(p) => gmon_config::load_links_yaml(p)?,
        None => Vec::new(),
    };

    let mut table = StreamTable::with_timeout(cfg.monitor.heartbeat_timeout_secs);
    let anomalies = gmon_anomaly::analyze_batch(&cfg.detector, &mut table, &records);

    let now = records
        .iter()
        .map(|r| r.timestamp)
        .max()
        .unwrap_or_else(Utc::now);
    let statuses = table.statuses(now);
    let active = table.active_links(now);
    let issues = gmon_reconcile::reconcile(&configured, &active, cfg.reconcile.match_mode);
    let report = gmon_report::build_link_report(now, &statuses, &configured, &issues, &anomalies);

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serialize report failed")?
    );
    Ok(())
}
