//! Shared runtime state for gmon-daemon.
//!
//! All types here are `Clone`-able (via `Arc` or copy). Handlers receive
//! `State<Arc<AppState>>` from Axum; this module owns nothing async itself.
//! The engine crates stay pure: every wall-clock read and every lock lives
//! here or in `routes.rs`.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use gmon_config::MonitorConfig;
use gmon_schemas::{ConfiguredLink, PacketRecord};
use gmon_stream::StreamTable;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// BusMsg — SSE event bus payload
// ---------------------------------------------------------------------------

/// Messages broadcast over the internal event bus and surfaced as SSE events.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMsg {
    Heartbeat {
        ts_millis: i64,
    },
    /// A publisher stream crossed its heartbeat window without a new packet.
    /// `silent_secs` is `None` when the stream never carried a timestamped
    /// update at all.
    Timeout {
        gocb_ref: String,
        silent_secs: Option<f64>,
    },
    LogLine {
        level: String,
        msg: String,
    },
}

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health responses.
#[derive(Clone, Debug, Serialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// PacketWindow
// ---------------------------------------------------------------------------

/// Bounded FIFO of the most recent normalized records, kept so the report
/// endpoint can run detection on demand. Oldest records are evicted first;
/// the running ingest total survives eviction.
#[derive(Debug)]
pub struct PacketWindow {
    buf: VecDeque<PacketRecord>,
    capacity: usize,
    total_ingested: u64,
}

impl PacketWindow {
    /// A capacity of zero keeps no history; ingest still counts records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            total_ingested: 0,
        }
    }

    pub fn push(&mut self, rec: PacketRecord) {
        self.total_ingested += 1;
        if self.capacity == 0 {
            return;
        }
        while self.buf.len() >= self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(rec);
    }

    /// Clone the retained records out so detection can run lock-free.
    pub fn snapshot(&self) -> Vec<PacketRecord> {
        self.buf.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn total_ingested(&self) -> u64 {
        self.total_ingested
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast bus for SSE.
    pub bus: broadcast::Sender<BusMsg>,
    /// Static build metadata.
    pub build: BuildInfo,
    /// Fresh UUID per daemon boot, reported by /v1/status.
    pub monitor_id: Uuid,
    /// Layered configuration, immutable after boot.
    pub config: MonitorConfig,
    /// SHA-256 of the canonical merged config JSON.
    pub config_hash: String,
    /// Engineered links loaded at boot; reconciliation baseline.
    pub configured: Vec<ConfiguredLink>,
    /// Live stream table. Writer: ingest handler. Readers: status/report.
    pub streams: Arc<RwLock<StreamTable>>,
    /// Bounded record history for on-demand detection.
    pub window: Arc<RwLock<PacketWindow>>,
}

impl AppState {
    pub fn new(config: MonitorConfig, config_hash: String, configured: Vec<ConfiguredLink>) -> Self {
        let (bus, _rx) = broadcast::channel::<BusMsg>(1024);

        let streams = StreamTable::with_timeout(config.monitor.heartbeat_timeout_secs);
        let window = PacketWindow::with_capacity(config.monitor.window_capacity);

        Self {
            bus,
            build: BuildInfo {
                service: "gmon-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            monitor_id: Uuid::new_v4(),
            config,
            config_hash,
            configured,
            streams: Arc::new(RwLock::new(streams)),
            window: Arc::new(RwLock::new(window)),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Monotonically increasing uptime since first call (process lifetime).
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}

/// Spawn a background task that emits a heartbeat SSE every `interval`.
pub fn spawn_heartbeat(bus: broadcast::Sender<BusMsg>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let ts = chrono::Utc::now().timestamp_millis();
            let _ = bus.send(BusMsg::Heartbeat { ts_millis: ts });
        }
    });
}

/// Spawn a background task that watches the stream table for heartbeat
/// timeouts.
///
/// On each interval:
/// - Reads `statuses(now)` from the shared table (read lock only).
/// - A stream newly seen as timed out broadcasts `BusMsg::Timeout` plus a
///   WARN `LogLine`, once per stale episode.
/// - A stream seen active again clears its episode marker and broadcasts an
///   INFO `LogLine`, so a later timeout is reported again.
pub fn spawn_timeout_watch(state: Arc<AppState>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        let mut reported: BTreeSet<String> = BTreeSet::new();
        loop {
            ticker.tick().await;
            let now = chrono::Utc::now();
            let statuses = { state.streams.read().await.statuses(now) };

            for s in statuses {
                if s.timed_out {
                    if reported.insert(s.gocb_ref.clone()) {
                        let silent_secs = s
                            .last_update
                            .map(|t| now.signed_duration_since(t).num_milliseconds() as f64 / 1000.0);
                        warn!(gocb_ref = %s.gocb_ref, ?silent_secs, "publisher stream timed out");
                        let _ = state.bus.send(BusMsg::Timeout {
                            gocb_ref: s.gocb_ref.clone(),
                            silent_secs,
                        });
                        let _ = state.bus.send(BusMsg::LogLine {
                            level: "WARN".to_string(),
                            msg: format!("publisher stream {} timed out", s.gocb_ref),
                        });
                    }
                } else if reported.remove(&s.gocb_ref) {
                    info!(gocb_ref = %s.gocb_ref, "publisher stream resumed");
                    let _ = state.bus.send(BusMsg::LogLine {
                        level: "INFO".to_string(),
                        msg: format!("publisher stream {} resumed", s.gocb_ref),
                    });
                }
            }
        }
    });
}
