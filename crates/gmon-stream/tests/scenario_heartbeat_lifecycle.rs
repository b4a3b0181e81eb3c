use chrono::{DateTime, TimeZone, Utc};
use gmon_schemas::PacketRecord;
use gmon_stream::*;

fn t(secs: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, secs).unwrap()
}

fn rec(gocb: &str, app_id: u16, sq: u32, ts: DateTime<Utc>) -> PacketRecord {
    PacketRecord {
        frame_number: u64::from(sq),
        timestamp: ts,
        src_mac: "00:11:22:33:44:55".to_string(),
        dst_mac: "01:0c:cd:01:00:01".to_string(),
        app_id,
        gocb_ref: gocb.to_string(),
        time_allowed_ms: Some(1000),
        st_num: 1,
        sq_num: sq,
        test: false,
        conf_rev: 1,
        nds_com: false,
        dataset: None,
        payload_len: 120,
    }
}

#[test]
fn scenario_heartbeat_lifecycle() {
    let mut table = StreamTable::new();

    // Publisher appears at t=0 and keeps a 1s cadence until t=3.
    for s in 0..4 {
        table.apply(&rec("IED1LD0/LLN0$GO$gcb01", 0x3001, s, t(s)));
    }

    // Within the 2s heartbeat window the stream is active.
    let status = &table.statuses(t(4))[0];
    assert!(!status.timed_out);
    assert_eq!(status.health, StreamHealth::Active);
    assert_eq!(status.sq_num, Some(3));

    // Silence past the window: stale, and no longer an active link.
    let status = &table.statuses(t(6))[0];
    assert!(status.timed_out);
    assert_eq!(status.health, StreamHealth::Stale);
    assert!(table.active_links(t(6)).is_empty());

    // Traffic resumes: the same stream becomes active again.
    table.apply(&rec("IED1LD0/LLN0$GO$gcb01", 0x3001, 4, t(6)));
    let status = &table.statuses(t(7))[0];
    assert_eq!(status.health, StreamHealth::Active);
    assert_eq!(table.active_links(t(7)).len(), 1);
}

#[test]
fn scenario_silent_stream_counts_as_timed_out() {
    // A table can know about a stream (first packet long ago) while a second
    // publisher has said nothing recently; both must read timed out, and the
    // one that never spoke at all reads Unknown.
    let mut table = StreamTable::new();
    table.apply(&rec("gcb_old", 0x3001, 0, t(0)));

    let silent = PublisherStreamState::new(0x3002);
    assert!(silent.is_timed_out(t(30)));
    assert_eq!(silent.health(t(30)), StreamHealth::Unknown);

    let statuses = table.statuses(t(30));
    assert!(statuses[0].timed_out);
    assert_eq!(statuses[0].health, StreamHealth::Stale);
}
