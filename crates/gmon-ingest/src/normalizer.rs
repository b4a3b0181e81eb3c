//! Normalization of raw decoder output into typed packet records.
//!
//! This module converts [`RawGooseRecord`] field dumps into
//! [`PacketRecord`] values with parsed timestamps, typed counters, and the
//! documented fallback behavior for malformed protocol fields.
//!
//! It does **not**:
//! - capture or dissect frames (external collaborator)
//! - run conformance checks (that is gmon-anomaly)
//! - track stream state (that is gmon-stream)

use std::fmt;

use chrono::{DateTime, Utc};
use gmon_schemas::PacketRecord;

use crate::raw::RawGooseRecord;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Structural faults that reject the whole batch.
///
/// Only two fields are load-bearing enough to refuse a record outright:
/// the control block reference (stream identity) and the timestamp
/// (ordering). Everything else degrades to a default instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// goCbRef absent or empty; `frame` is the raw frame number text
    /// (`"?"` when the decoder did not number the frame).
    MissingControlBlockRef { frame: String },
    /// Timestamp field absent.
    MissingTimestamp { frame: String },
    /// Timestamp present but neither RFC 3339 nor epoch seconds.
    UnparsableTimestamp { frame: String, raw: String },
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::MissingControlBlockRef { frame } => {
                write!(
                    f,
                    "frame {frame}: goCbRef missing or empty (stream identity required)"
                )
            }
            NormalizeError::MissingTimestamp { frame } => {
                write!(f, "frame {frame}: timestamp missing")
            }
            NormalizeError::UnparsableTimestamp { frame, raw } => {
                write!(
                    f,
                    "frame {frame}: timestamp '{raw}' is neither RFC 3339 nor epoch seconds"
                )
            }
        }
    }
}

impl std::error::Error for NormalizeError {}

// ---------------------------------------------------------------------------
// Lenient field parsers
// ---------------------------------------------------------------------------

/// Parse an unsigned counter field, falling back to 0.
///
/// Decoders emit `"N/A"`, empty strings, or garbage for fields they could
/// not dissect; a counter of 0 keeps the record alive so the remaining
/// checks still run on it.
fn parse_u32_or_zero(v: Option<&str>) -> u32 {
    v.and_then(|s| s.trim().parse::<u32>().ok()).unwrap_or(0)
}

fn parse_u64_or_zero(v: Option<&str>) -> u64 {
    v.and_then(|s| s.trim().parse::<u64>().ok()).unwrap_or(0)
}

/// Application id: decimal or `0x`-prefixed hex, fallback 0.
fn parse_app_id(v: Option<&str>) -> u16 {
    let Some(s) = v.map(str::trim) else {
        return 0;
    };
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).ok()
    } else {
        s.parse::<u16>().ok()
    };
    parsed.unwrap_or(0)
}

/// Boolean flags: `"1"`, `"true"` (any case) set the flag, anything
/// else (including absence) clears it.
fn parse_flag(v: Option<&str>) -> bool {
    match v.map(str::trim) {
        Some("1") => true,
        Some(s) => s.eq_ignore_ascii_case("true"),
        None => false,
    }
}

/// timeAllowedToLive: unparsable or absent becomes `None` so the timing
/// checks can apply their own default rather than a fabricated 0 ms.
fn parse_ttl_ms(v: Option<&str>) -> Option<u32> {
    v.and_then(|s| s.trim().parse::<u32>().ok())
}

fn parse_dataset(v: Option<&str>) -> Option<String> {
    match v.map(str::trim) {
        None | Some("") | Some("N/A") => None,
        Some(s) => Some(s.to_string()),
    }
}

/// Timestamp: RFC 3339 first, then epoch seconds with optional fraction.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let epoch: f64 = s.trim().parse().ok()?;
    if !epoch.is_finite() {
        return None;
    }
    let secs = epoch.floor() as i64;
    let nanos = ((epoch - epoch.floor()) * 1_000_000_000.0).round() as u32;
    DateTime::from_timestamp(secs, nanos.min(999_999_999))
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn frame_label(raw: &RawGooseRecord) -> String {
    raw.frame_number
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("?")
        .to_string()
}

/// Normalize a single [`RawGooseRecord`] into a [`PacketRecord`].
///
/// Returns `Err` only for the structural faults listed on
/// [`NormalizeError`]; every other malformed field degrades per the
/// parser rules above.
pub fn normalize(raw: &RawGooseRecord) -> Result<PacketRecord, NormalizeError> {
    let gocb_ref = match raw.gocb_ref.as_deref().map(str::trim) {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => {
            return Err(NormalizeError::MissingControlBlockRef {
                frame: frame_label(raw),
            })
        }
    };

    let ts_raw = match raw.timestamp.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => {
            return Err(NormalizeError::MissingTimestamp {
                frame: frame_label(raw),
            })
        }
    };
    let timestamp = parse_timestamp(ts_raw).ok_or_else(|| NormalizeError::UnparsableTimestamp {
        frame: frame_label(raw),
        raw: ts_raw.to_string(),
    })?;

    Ok(PacketRecord {
        frame_number: parse_u64_or_zero(raw.frame_number.as_deref()),
        timestamp,
        src_mac: raw.src_mac.clone().unwrap_or_default(),
        dst_mac: raw.dst_mac.clone().unwrap_or_default(),
        app_id: parse_app_id(raw.appid.as_deref()),
        gocb_ref,
        time_allowed_ms: parse_ttl_ms(raw.time_allowed.as_deref()),
        st_num: parse_u32_or_zero(raw.st_num.as_deref()),
        sq_num: parse_u32_or_zero(raw.sq_num.as_deref()),
        test: parse_flag(raw.test.as_deref()),
        conf_rev: parse_u32_or_zero(raw.conf_rev.as_deref()),
        nds_com: parse_flag(raw.nds_com.as_deref()),
        dataset: parse_dataset(raw.dataset.as_deref()),
        payload_len: parse_u32_or_zero(raw.packet_size.as_deref()),
    })
}

/// Normalize a batch all-or-nothing.
///
/// Returns `Ok` only if every record normalizes; the first structural
/// fault rejects the whole batch. An empty batch is valid and yields an
/// empty vector.
pub fn normalize_batch(records: &[RawGooseRecord]) -> Result<Vec<PacketRecord>, NormalizeError> {
    records.iter().map(normalize).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
