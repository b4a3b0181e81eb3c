//! Scenario: the timeout watcher reports stale publishers over the event bus.
//!
//! # Invariants under test
//!
//! 1. A stream that crosses its heartbeat window MUST produce exactly one
//!    `BusMsg::Timeout` per stale episode, not one per tick.
//!
//! 2. A stream that resumes publishing clears the episode; a later silence
//!    MUST produce a second `BusMsg::Timeout`.
//!
//! 3. A stream inside its heartbeat window produces no timeout events.
//!
//! All tests are pure in-process; no network required. The watcher runs on a
//! 10ms tick and the assertions allow many ticks to elapse, the same slack
//! the other background-task tests use.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use gmon_config::MonitorConfig;
use gmon_daemon::state::{self, AppState, BusMsg};
use gmon_testkit::packet;

const GCB: &str = "IED_PROT_A1LD0/LLN0$GO$gcb01";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// AppState whose streams go stale after `timeout_secs` of silence.
fn make_state(timeout_secs: f64) -> Arc<AppState> {
    let mut cfg = MonitorConfig::default();
    cfg.monitor.heartbeat_timeout_secs = timeout_secs;
    Arc::new(AppState::new(cfg, "hash".to_string(), Vec::new()))
}

/// Drain everything currently queued on the receiver.
fn drain(rx: &mut tokio::sync::broadcast::Receiver<BusMsg>) -> Vec<BusMsg> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

fn count_timeouts(msgs: &[BusMsg], gocb_ref: &str) -> usize {
    msgs.iter()
        .filter(|m| matches!(m, BusMsg::Timeout { gocb_ref: g, .. } if g == gocb_ref))
        .count()
}

// ---------------------------------------------------------------------------
// 1. One timeout event per stale episode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn watch_emits_one_timeout_per_stale_episode() {
    let st = make_state(0.05);
    {
        let mut table = st.streams.write().await;
        table.apply(&packet(GCB, 1, Utc::now(), 1, 0));
    }

    let mut rx = st.bus.subscribe();
    state::spawn_timeout_watch(Arc::clone(&st), Duration::from_millis(10));

    // Many ticks after the 50ms window has passed.
    tokio::time::sleep(Duration::from_millis(150)).await;

    let msgs = drain(&mut rx);
    assert_eq!(
        count_timeouts(&msgs, GCB),
        1,
        "stale episode must be reported once, got: {msgs:?}"
    );

    let silent = msgs.iter().find_map(|m| match m {
        BusMsg::Timeout { silent_secs, .. } => Some(*silent_secs),
        _ => None,
    });
    assert!(
        matches!(silent, Some(Some(s)) if s > 0.0),
        "timeout event should carry the silence duration: {silent:?}"
    );
}

// ---------------------------------------------------------------------------
// 2. Resume clears the episode; second silence reports again
// ---------------------------------------------------------------------------

#[tokio::test]
async fn watch_reports_resume_then_second_episode() {
    let st = make_state(0.05);
    {
        let mut table = st.streams.write().await;
        table.apply(&packet(GCB, 1, Utc::now(), 1, 0));
    }

    let mut rx = st.bus.subscribe();
    state::spawn_timeout_watch(Arc::clone(&st), Duration::from_millis(10));

    // Episode 1.
    tokio::time::sleep(Duration::from_millis(150)).await;

    // The publisher comes back.
    {
        let mut table = st.streams.write().await;
        table.apply(&packet(GCB, 2, Utc::now(), 1, 1));
    }

    // Episode 2 after the window passes again.
    tokio::time::sleep(Duration::from_millis(150)).await;

    let msgs = drain(&mut rx);
    assert_eq!(
        count_timeouts(&msgs, GCB),
        2,
        "each stale episode must be reported: {msgs:?}"
    );

    let resumed = msgs.iter().any(
        |m| matches!(m, BusMsg::LogLine { msg, .. } if msg.contains("resumed")),
    );
    assert!(resumed, "resume should be logged on the bus: {msgs:?}");
}

// ---------------------------------------------------------------------------
// 3. Active stream stays quiet
// ---------------------------------------------------------------------------

#[tokio::test]
async fn watch_ignores_stream_inside_heartbeat_window() {
    // Default 2s window; the test finishes long before it closes.
    let st = make_state(2.0);
    {
        let mut table = st.streams.write().await;
        table.apply(&packet(GCB, 1, Utc::now(), 1, 0));
    }

    let mut rx = st.bus.subscribe();
    state::spawn_timeout_watch(Arc::clone(&st), Duration::from_millis(10));

    tokio::time::sleep(Duration::from_millis(100)).await;

    let msgs = drain(&mut rx);
    assert_eq!(
        count_timeouts(&msgs, GCB),
        0,
        "active stream must not be reported: {msgs:?}"
    );
}
