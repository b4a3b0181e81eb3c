use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use gmon_schemas::PacketRecord;
use gmon_stream::StreamTable;

use crate::types::{AnomalyKind, AnomalyRecord, DetectorConfig, Severity, ALL_STREAMS};

/// Cadence statistics need this many packets in a stream before they mean
/// anything.
const MIN_INTERVAL_PACKETS: usize = 4;

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run every check family over a batch of decoded frames.
///
/// The function is **deterministic**: records are sorted internally by
/// `(timestamp, frame_number)` and grouped by control block reference, so
/// the same set of records produces the same findings regardless of input
/// order. No mutation of the caller's data occurs.
pub fn detect(cfg: &DetectorConfig, records: &[PacketRecord]) -> Vec<AnomalyRecord> {
    let mut findings = Vec::new();
    if records.is_empty() {
        return findings;
    }

    let mut sorted: Vec<&PacketRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.frame_number.cmp(&b.frame_number))
    });

    // Group by goCbRef; BTreeMap keeps finding order stable across runs.
    let mut groups: BTreeMap<&str, Vec<&PacketRecord>> = BTreeMap::new();
    for rec in &sorted {
        groups.entry(rec.gocb_ref.as_str()).or_default().push(rec);
    }

    for (gocb_ref, pkts) in &groups {
        check_sequence(gocb_ref, pkts, &mut findings);
        check_timeout(cfg, gocb_ref, pkts, &mut findings);
        check_interval_variation(cfg, gocb_ref, pkts, &mut findings);
        check_state_counters(cfg, gocb_ref, pkts, &mut findings);
        check_test_mode(gocb_ref, pkts, &mut findings);
        check_conf_rev(gocb_ref, pkts, &mut findings);
        check_nds_com(gocb_ref, pkts, &mut findings);
    }

    check_rate(cfg, &sorted, &mut findings);

    findings
}

/// Ingest-coupled entry: records every frame into `table` (this is the
/// mutation), then runs [`detect`] over the batch.
pub fn analyze_batch(
    cfg: &DetectorConfig,
    table: &mut StreamTable,
    records: &[PacketRecord],
) -> Vec<AnomalyRecord> {
    for rec in records {
        table.apply(rec);
    }
    detect(cfg, records)
}

// ---------------------------------------------------------------------------
// Per-stream checks
// ---------------------------------------------------------------------------

fn check_sequence(gocb_ref: &str, pkts: &[&PacketRecord], out: &mut Vec<AnomalyRecord>) {
    for pair in pkts.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        // sqNum resets to 0 after a state change; a received 0 is always in
        // order (this also forgives a spurious 0, a deliberate leniency).
        if cur.sq_num == 0 {
            continue;
        }
        let expected = prev.sq_num.wrapping_add(1);
        if cur.sq_num != expected {
            out.push(AnomalyRecord {
                kind: AnomalyKind::SequenceGap,
                timestamp: cur.timestamp,
                gocb_ref: gocb_ref.to_string(),
                severity: Severity::High,
                message: format!(
                    "sqNum gap: expected {} after {}, got {}",
                    expected, prev.sq_num, cur.sq_num
                ),
            });
        }
    }
}

fn check_timeout(
    cfg: &DetectorConfig,
    gocb_ref: &str,
    pkts: &[&PacketRecord],
    out: &mut Vec<AnomalyRecord>,
) {
    // The stream's allowance comes from its first frame in the batch;
    // publishers keep TTL constant in steady state.
    let ttl_secs = pkts[0]
        .time_allowed_ms
        .map(|ms| f64::from(ms) / 1000.0)
        .unwrap_or(cfg.default_ttl_secs);
    let threshold = cfg.ttl_tolerance_factor * ttl_secs;

    for pair in pkts.windows(2) {
        let gap = gap_seconds(pair[0].timestamp, pair[1].timestamp);
        if gap > threshold {
            out.push(AnomalyRecord {
                kind: AnomalyKind::Timeout,
                timestamp: pair[1].timestamp,
                gocb_ref: gocb_ref.to_string(),
                severity: Severity::Critical,
                message: format!(
                    "gap {gap:.3}s exceeds timeout threshold {threshold:.3}s (TTL {ttl_secs:.3}s)"
                ),
            });
        }
    }
}

fn check_interval_variation(
    cfg: &DetectorConfig,
    gocb_ref: &str,
    pkts: &[&PacketRecord],
    out: &mut Vec<AnomalyRecord>,
) {
    if pkts.len() < MIN_INTERVAL_PACKETS {
        return;
    }

    let gaps: Vec<f64> = pkts
        .windows(2)
        .map(|pair| gap_seconds(pair[0].timestamp, pair[1].timestamp))
        .collect();

    let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
    let variance = gaps
        .iter()
        .map(|g| {
            let d = g - mean;
            d * d
        })
        .sum::<f64>()
        / gaps.len() as f64;
    let stddev = variance.sqrt();

    if stddev > cfg.interval_stddev_ratio * mean {
        let last = pkts[pkts.len() - 1];
        out.push(AnomalyRecord {
            kind: AnomalyKind::IntervalVariation,
            timestamp: last.timestamp,
            gocb_ref: gocb_ref.to_string(),
            severity: Severity::Medium,
            message: format!(
                "irregular cadence: stddev {stddev:.4}s vs mean {mean:.4}s over {} gaps",
                gaps.len()
            ),
        });
    }
}

fn check_state_counters(
    cfg: &DetectorConfig,
    gocb_ref: &str,
    pkts: &[&PacketRecord],
    out: &mut Vec<AnomalyRecord>,
) {
    for pair in pkts.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        if cur.st_num < prev.st_num {
            out.push(AnomalyRecord {
                kind: AnomalyKind::StnumDecrease,
                timestamp: cur.timestamp,
                gocb_ref: gocb_ref.to_string(),
                severity: Severity::High,
                message: format!("stNum decreased from {} to {}", prev.st_num, cur.st_num),
            });
        }
        if cur.st_num > prev.st_num.saturating_add(cfg.stnum_jump_threshold) {
            out.push(AnomalyRecord {
                kind: AnomalyKind::StnumJump,
                timestamp: cur.timestamp,
                gocb_ref: gocb_ref.to_string(),
                severity: Severity::Medium,
                message: format!(
                    "stNum jumped from {} to {} (threshold +{})",
                    prev.st_num, cur.st_num, cfg.stnum_jump_threshold
                ),
            });
        }
    }
}

fn check_test_mode(gocb_ref: &str, pkts: &[&PacketRecord], out: &mut Vec<AnomalyRecord>) {
    for p in pkts {
        if p.test {
            // Commissioning work announces itself via ndsCom; a test frame
            // without it on a live network is the serious case.
            let severity = if p.nds_com {
                Severity::Low
            } else {
                Severity::High
            };
            out.push(AnomalyRecord {
                kind: AnomalyKind::TestMode,
                timestamp: p.timestamp,
                gocb_ref: gocb_ref.to_string(),
                severity,
                message: format!("test flag set (ndsCom={})", p.nds_com),
            });
        }
    }
}

fn check_conf_rev(gocb_ref: &str, pkts: &[&PacketRecord], out: &mut Vec<AnomalyRecord>) {
    let revs: BTreeSet<u32> = pkts.iter().map(|p| p.conf_rev).collect();
    if revs.len() > 1 {
        let listed: Vec<u32> = revs.into_iter().collect();
        let last = pkts[pkts.len() - 1];
        out.push(AnomalyRecord {
            kind: AnomalyKind::ConfigChange,
            timestamp: last.timestamp,
            gocb_ref: gocb_ref.to_string(),
            severity: Severity::Medium,
            message: format!("multiple confRev values in batch: {listed:?}"),
        });
    }
}

fn check_nds_com(gocb_ref: &str, pkts: &[&PacketRecord], out: &mut Vec<AnomalyRecord>) {
    for p in pkts {
        if p.nds_com {
            out.push(AnomalyRecord {
                kind: AnomalyKind::NdscomFlag,
                timestamp: p.timestamp,
                gocb_ref: gocb_ref.to_string(),
                severity: Severity::Medium,
                message: "ndsCom flag set (device needs commissioning)".to_string(),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Batch-wide checks
// ---------------------------------------------------------------------------

fn check_rate(cfg: &DetectorConfig, sorted: &[&PacketRecord], out: &mut Vec<AnomalyRecord>) {
    let first = sorted[0];
    let last = sorted[sorted.len() - 1];
    let duration = gap_seconds(first.timestamp, last.timestamp);
    // A batch with no time extent has no measurable rate.
    if duration <= 0.0 {
        return;
    }
    let rate = sorted.len() as f64 / duration;

    if rate > cfg.high_rate_pps {
        out.push(AnomalyRecord {
            kind: AnomalyKind::HighRate,
            timestamp: last.timestamp,
            gocb_ref: ALL_STREAMS.to_string(),
            severity: Severity::Medium,
            message: format!(
                "rate {rate:.1} pkt/s over {duration:.3}s exceeds {:.1} pkt/s",
                cfg.high_rate_pps
            ),
        });
    }
    if rate < cfg.low_rate_pps {
        out.push(AnomalyRecord {
            kind: AnomalyKind::LowRate,
            timestamp: last.timestamp,
            gocb_ref: ALL_STREAMS.to_string(),
            severity: Severity::Medium,
            message: format!(
                "rate {rate:.4} pkt/s over {duration:.3}s below {:.1} pkt/s",
                cfg.low_rate_pps
            ),
        });
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn gap_seconds(prev: DateTime<Utc>, next: DateTime<Utc>) -> f64 {
    let d = next.signed_duration_since(prev);
    d.num_microseconds()
        .map(|us| us as f64 / 1_000_000.0)
        .unwrap_or(d.num_milliseconds() as f64 / 1000.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
