use chrono::{DateTime, TimeZone, Utc};
use gmon_anomaly::*;
use gmon_schemas::PacketRecord;

fn t(ms: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + chrono::Duration::milliseconds(ms)
}

fn frame(n: u64, ms: i64, st: u32, sq: u32, conf_rev: u32) -> PacketRecord {
    PacketRecord {
        frame_number: n,
        timestamp: t(ms),
        src_mac: String::new(),
        dst_mac: String::new(),
        app_id: 0x3001,
        gocb_ref: "gcb01".to_string(),
        time_allowed_ms: Some(1000),
        st_num: st,
        sq_num: sq,
        test: false,
        conf_rev,
        nds_com: false,
        dataset: None,
        payload_len: 0,
    }
}

#[test]
fn scenario_replayed_state_counter_flags_decrease() {
    let cfg = DetectorConfig::default();

    // stNum walks 1,1,2 then an old frame with stNum 1 shows up again.
    let batch = vec![
        frame(1, 0, 1, 0, 1),
        frame(2, 500, 1, 1, 1),
        frame(3, 1000, 2, 0, 1),
        frame(4, 1500, 1, 0, 1),
    ];
    let findings = detect(&cfg, &batch);

    let decreases: Vec<_> = findings
        .iter()
        .filter(|a| a.kind == AnomalyKind::StnumDecrease)
        .collect();
    assert_eq!(decreases.len(), 1);
    assert_eq!(decreases[0].severity, Severity::High);
    assert_eq!(decreases[0].message, "stNum decreased from 2 to 1");
}

#[test]
fn scenario_event_burst_beyond_plausible_step_flags_jump() {
    let cfg = DetectorConfig::default();

    // 1 -> 1 -> 15 skips fourteen state changes in one step.
    let batch = vec![
        frame(1, 0, 1, 0, 1),
        frame(2, 500, 1, 1, 1),
        frame(3, 1000, 15, 0, 1),
    ];
    let findings = detect(&cfg, &batch);

    let jumps: Vec<_> = findings
        .iter()
        .filter(|a| a.kind == AnomalyKind::StnumJump)
        .collect();
    assert_eq!(jumps.len(), 1);
    assert_eq!(jumps[0].severity, Severity::Medium);
    assert!(findings
        .iter()
        .all(|a| a.kind != AnomalyKind::StnumDecrease));
}

#[test]
fn scenario_reconfigured_device_flags_conf_rev_set_once() {
    let cfg = DetectorConfig::default();

    // confRev moves 1 -> 2 mid-batch and also briefly shows 3: one finding
    // listing all distinct revisions, attributed to the last frame.
    let batch = vec![
        frame(1, 0, 1, 0, 1),
        frame(2, 500, 1, 1, 2),
        frame(3, 1000, 1, 2, 3),
        frame(4, 1500, 1, 3, 2),
    ];
    let findings = detect(&cfg, &batch);

    let changes: Vec<_> = findings
        .iter()
        .filter(|a| a.kind == AnomalyKind::ConfigChange)
        .collect();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].timestamp, t(1500));
    assert_eq!(
        changes[0].message,
        "multiple confRev values in batch: [1, 2, 3]"
    );
}
