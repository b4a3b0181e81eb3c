use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One decoded GOOSE frame after normalization.
///
/// `gocb_ref` is the stream identity: every per-stream structure in the
/// workspace is keyed by it. Optional fields are protocol fields the decoder
/// could not supply; numeric fields that failed to parse upstream arrive
/// here as 0 (see gmon-ingest for the fallback rules).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketRecord {
    pub frame_number: u64,
    pub timestamp: DateTime<Utc>,
    pub src_mac: String,
    pub dst_mac: String,
    pub app_id: u16,
    /// GOOSE control block reference (stream key).
    pub gocb_ref: String,
    /// timeAllowedToLive in milliseconds; `None` when the decoder did not
    /// supply a usable value. Checks apply their own default.
    pub time_allowed_ms: Option<u32>,
    pub st_num: u32,
    pub sq_num: u32,
    pub test: bool,
    pub conf_rev: u32,
    pub nds_com: bool,
    pub dataset: Option<String>,
    pub payload_len: u32,
}

/// An expected publish/subscribe relationship from the engineered
/// substation configuration (flat list extracted upstream, not SCL XML).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfiguredLink {
    pub publisher: String,
    pub subscriber: String,
    pub control_ref: String,
    pub app_id: u16,
    pub dataset: String,
}

/// A link inferred from live traffic. Observed frames carry an application
/// id but do not independently resolve device names, hence the options.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActiveLink {
    pub publisher: Option<String>,
    pub subscriber: Option<String>,
    pub app_id: u16,
}
