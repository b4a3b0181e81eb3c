use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stream key used for findings that concern the whole batch rather than a
/// single control block (the traffic-rate checks).
pub const ALL_STREAMS: &str = "ALL";

/// Operator-facing severity ladder.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of finding types. Consumers match on this, never on message
/// text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyKind {
    /// sqNum not contiguous within a stream.
    SequenceGap,
    /// Inter-frame gap exceeded the timeAllowedToLive allowance.
    Timeout,
    /// Retransmission cadence irregular across a stream.
    IntervalVariation,
    /// stNum went backwards.
    StnumDecrease,
    /// stNum advanced implausibly far in one step.
    StnumJump,
    /// Frame published with the test flag set.
    TestMode,
    /// More than one confRev seen for one stream in a batch.
    ConfigChange,
    /// Frame published with the needs-commissioning flag set.
    NdscomFlag,
    /// Batch-wide traffic rate above the ceiling.
    HighRate,
    /// Batch-wide traffic rate below the floor.
    LowRate,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::SequenceGap => "SEQUENCE_GAP",
            AnomalyKind::Timeout => "TIMEOUT",
            AnomalyKind::IntervalVariation => "INTERVAL_VARIATION",
            AnomalyKind::StnumDecrease => "STNUM_DECREASE",
            AnomalyKind::StnumJump => "STNUM_JUMP",
            AnomalyKind::TestMode => "TEST_MODE",
            AnomalyKind::ConfigChange => "CONFIG_CHANGE",
            AnomalyKind::NdscomFlag => "NDSCOM_FLAG",
            AnomalyKind::HighRate => "HIGH_RATE",
            AnomalyKind::LowRate => "LOW_RATE",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding, attributed to the frame that made it observable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub kind: AnomalyKind,
    pub timestamp: DateTime<Utc>,
    /// Control block reference of the affected stream, or [`ALL_STREAMS`].
    pub gocb_ref: String,
    pub severity: Severity,
    /// Human-readable description carrying the literal offending values.
    pub message: String,
}

/// Check thresholds. Defaults are the operating values; deployments
/// override individual fields through the monitor configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// stNum may advance at most this far in one step before it is a jump.
    pub stnum_jump_threshold: u32,
    /// Factor applied to a stream's TTL to get the timeout threshold.
    pub ttl_tolerance_factor: f64,
    /// Cadence is irregular when stddev exceeds this fraction of the mean.
    pub interval_stddev_ratio: f64,
    /// Batch rate ceiling in packets per second.
    pub high_rate_pps: f64,
    /// Batch rate floor in packets per second.
    pub low_rate_pps: f64,
    /// TTL assumed for streams whose frames carry no timeAllowedToLive.
    pub default_ttl_secs: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            stnum_jump_threshold: 10,
            ttl_tolerance_factor: 2.0,
            interval_stddev_ratio: 0.5,
            high_rate_pps: 100.0,
            low_rate_pps: 0.1,
            default_ttl_secs: 1.0,
        }
    }
}
