//! Request and response types for all gmon-daemon HTTP endpoints.
//!
//! These types are `Serialize + Deserialize` so they can be JSON-encoded
//! by Axum and decoded by tests.  No business logic lives here; the report
//! endpoint returns `gmon_report::LinkReport` directly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

// Serialize-only: the static strs come from build metadata.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// /v1/status
// ---------------------------------------------------------------------------

/// Point-in-time snapshot of the monitor, returned by GET /v1/status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub monitor_id: Uuid,
    pub uptime_secs: u64,
    pub config_hash: String,
    /// Total records accepted since boot, including any evicted from the
    /// bounded window.
    pub records_ingested: u64,
    pub stream_count: usize,
}

// ---------------------------------------------------------------------------
// /v1/records
// ---------------------------------------------------------------------------

/// 200 body: the whole batch was normalized and applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestAccepted {
    pub accepted: usize,
    pub stream_count: usize,
}

/// 400 body: a structural hard fault rejected the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRejected {
    pub error: String,
}
