use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use gmon_ingest::RawGooseRecord;
use gmon_schemas::PacketRecord;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

/// Parse an RFC 3339 timestamp, panicking on bad input (test fixtures only).
pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .unwrap_or_else(|e| panic!("bad fixture timestamp {s:?}: {e}"))
        .with_timezone(&Utc)
}

/// Fixture base instant; offsets in scenarios are relative to this.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// A healthy steady-state packet for `gocb`; scenarios mutate the fields
/// they care about.
pub fn packet(gocb: &str, frame: u64, timestamp: DateTime<Utc>, st: u32, sq: u32) -> PacketRecord {
    PacketRecord {
        frame_number: frame,
        timestamp,
        src_mac: "00:30:a7:00:00:01".to_string(),
        dst_mac: "01:0c:cd:01:00:01".to_string(),
        app_id: 0x3001,
        gocb_ref: gocb.to_string(),
        time_allowed_ms: Some(1000),
        st_num: st,
        sq_num: sq,
        test: false,
        conf_rev: 1,
        nds_com: false,
        dataset: Some("IED1LD0/LLN0$DataSet1".to_string()),
        payload_len: 146,
    }
}

/// The same packet in decoder form, for exercising the ingest boundary.
pub fn raw_packet(gocb: &str, frame: u64, timestamp: &str, st: u32, sq: u32) -> RawGooseRecord {
    RawGooseRecord {
        frame_number: Some(frame.to_string()),
        timestamp: Some(timestamp.to_string()),
        src_mac: Some("00:30:a7:00:00:01".to_string()),
        dst_mac: Some("01:0c:cd:01:00:01".to_string()),
        appid: Some("0x3001".to_string()),
        gocb_ref: Some(gocb.to_string()),
        time_allowed: Some("1000".to_string()),
        st_num: Some(st.to_string()),
        sq_num: Some(sq.to_string()),
        test: Some("0".to_string()),
        conf_rev: Some("1".to_string()),
        nds_com: Some("0".to_string()),
        dataset: Some("IED1LD0/LLN0$DataSet1".to_string()),
        packet_size: Some("146".to_string()),
    }
}

pub fn load_raw_records_json(path: &str) -> Result<Vec<RawGooseRecord>> {
    let s = fs::read_to_string(path).with_context(|| format!("read records: {path}"))?;
    let records: Vec<RawGooseRecord> =
        serde_json::from_str(&s).context("parse records json")?;
    Ok(records)
}

/// Write a decoder batch to a temp file and hand back the handle (the file
/// lives as long as the handle does).
pub fn write_raw_records_file(records: &[RawGooseRecord]) -> Result<NamedTempFile> {
    let mut f = NamedTempFile::new().context("create temp records file")?;
    let body = serde_json::to_string_pretty(records).context("serialize records")?;
    f.write_all(body.as_bytes()).context("write records")?;
    f.flush().context("flush records")?;
    Ok(f)
}

pub fn write_yaml_file(body: &str) -> Result<NamedTempFile> {
    let mut f = NamedTempFile::new().context("create temp yaml file")?;
    f.write_all(body.as_bytes()).context("write yaml")?;
    f.flush().context("flush yaml")?;
    Ok(f)
}
