//! Scenario tests for `gmon analyze` driven through the real binary.

use assert_cmd::prelude::*;
use gmon_testkit::{raw_packet, write_raw_records_file};
use predicates::prelude::*;

const GCB: &str = "IED_PROT_A1LD0/LLN0$GO$gcb01";

// ---------------------------------------------------------------------------
// Anomalous capture: one sqNum gap, one stNum decrease
// ---------------------------------------------------------------------------

#[test]
fn analyze_reports_expected_anomaly_kinds() -> anyhow::Result<()> {
    let records = vec![
        raw_packet(GCB, 1, "2024-03-01T12:00:00Z", 2, 0),
        // sqNum should be 1 after 0; a restart would have been sqNum 0.
        raw_packet(GCB, 2, "2024-03-01T12:00:00.500Z", 2, 5),
        raw_packet(GCB, 3, "2024-03-01T12:00:01Z", 1, 0),
    ];
    let file = write_raw_records_file(&records)?;

    let mut cmd = assert_cmd::Command::cargo_bin("gmon-cli")?;
    cmd.args(["analyze", "--records", file.path().to_str().unwrap()]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("anomalies=2"))
        .stdout(predicate::str::contains("SEQUENCE_GAP"))
        .stdout(predicate::str::contains("STNUM_DECREASE"))
        .stdout(predicate::str::contains("severity.HIGH=2"))
        .stdout(predicate::str::contains("kind.SEQUENCE_GAP=1"));

    Ok(())
}

// ---------------------------------------------------------------------------
// Clean capture
// ---------------------------------------------------------------------------

#[test]
fn analyze_clean_capture_reports_zero_anomalies() -> anyhow::Result<()> {
    let records = vec![
        raw_packet(GCB, 1, "2024-03-01T12:00:00Z", 4, 0),
        raw_packet(GCB, 2, "2024-03-01T12:00:00.500Z", 4, 1),
        raw_packet(GCB, 3, "2024-03-01T12:00:01Z", 4, 2),
    ];
    let file = write_raw_records_file(&records)?;

    let mut cmd = assert_cmd::Command::cargo_bin("gmon-cli")?;
    cmd.args(["analyze", "--records", file.path().to_str().unwrap()]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("records=3"))
        .stdout(predicate::str::contains("anomalies=0"));

    Ok(())
}

// ---------------------------------------------------------------------------
// Structural hard fault aborts with non-zero exit
// ---------------------------------------------------------------------------

#[test]
fn analyze_fails_loudly_on_missing_gocb_ref() -> anyhow::Result<()> {
    let mut bad = raw_packet(GCB, 2, "2024-03-01T12:00:00.500Z", 2, 1);
    bad.gocb_ref = None;
    let records = vec![raw_packet(GCB, 1, "2024-03-01T12:00:00Z", 2, 0), bad];
    let file = write_raw_records_file(&records)?;

    let mut cmd = assert_cmd::Command::cargo_bin("gmon-cli")?;
    cmd.args(["analyze", "--records", file.path().to_str().unwrap()]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("goCbRef"));

    Ok(())
}

#[test]
fn analyze_fails_loudly_on_unreadable_records_file() -> anyhow::Result<()> {
    let mut cmd = assert_cmd::Command::cargo_bin("gmon-cli")?;
    cmd.args(["analyze", "--records", "/no/such/records.json"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("/no/such/records.json"));

    Ok(())
}

// ---------------------------------------------------------------------------
// Detector thresholds come from the layered config
// ---------------------------------------------------------------------------

#[test]
fn analyze_honors_config_stnum_jump_threshold() -> anyhow::Result<()> {
    // A jump of +5 is quiet under the default threshold (+10) but anomalous
    // once the config tightens it to +3.
    let records = vec![
        raw_packet(GCB, 1, "2024-03-01T12:00:00Z", 2, 0),
        raw_packet(GCB, 2, "2024-03-01T12:00:00.500Z", 7, 0),
    ];
    let file = write_raw_records_file(&records)?;
    let cfg = gmon_testkit::write_yaml_file("detector:\n  stnum_jump_threshold: 3\n")?;

    let mut cmd = assert_cmd::Command::cargo_bin("gmon-cli")?;
    cmd.args([
        "analyze",
        "--records",
        file.path().to_str().unwrap(),
        "--config",
        cfg.path().to_str().unwrap(),
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("STNUM_JUMP"))
        .stdout(predicate::str::contains("anomalies=1"));

    Ok(())
}
