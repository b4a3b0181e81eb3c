use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default heartbeat window in seconds before a silent stream counts as
/// timed out.
pub const DEFAULT_HEARTBEAT_TIMEOUT_SECS: f64 = 2.0;

/// Coarse health of a publisher stream at a given instant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamHealth {
    /// Known from configuration or table creation, no packet seen yet.
    Unknown,
    /// Last packet arrived within the heartbeat window.
    Active,
    /// Heartbeat window elapsed since the last packet.
    Stale,
}

/// Live state for one publisher stream (one goCbRef).
#[derive(Clone, Debug, PartialEq)]
pub struct PublisherStreamState {
    pub app_id: u16,
    pub last_st_num: Option<u32>,
    pub last_sq_num: Option<u32>,
    pub last_update: Option<DateTime<Utc>>,
    pub heartbeat_timeout_secs: f64,
}

impl PublisherStreamState {
    pub fn new(app_id: u16) -> Self {
        Self::with_timeout(app_id, DEFAULT_HEARTBEAT_TIMEOUT_SECS)
    }

    pub fn with_timeout(app_id: u16, heartbeat_timeout_secs: f64) -> Self {
        Self {
            app_id,
            last_st_num: None,
            last_sq_num: None,
            last_update: None,
            heartbeat_timeout_secs,
        }
    }

    /// Record the latest observation. Overwrites unconditionally; an
    /// out-of-order or anomalous counter still represents the newest thing
    /// we heard from this publisher.
    pub fn update(&mut self, st_num: u32, sq_num: u32, timestamp: DateTime<Utc>) {
        self.last_st_num = Some(st_num);
        self.last_sq_num = Some(sq_num);
        self.last_update = Some(timestamp);
    }

    /// True when no packet has ever been recorded, or the heartbeat window
    /// has elapsed since the last one.
    pub fn is_timed_out(&self, now: DateTime<Utc>) -> bool {
        match self.last_update {
            None => true,
            Some(last) => {
                let elapsed = now.signed_duration_since(last);
                let elapsed_secs = elapsed
                    .num_microseconds()
                    .map(|us| us as f64 / 1_000_000.0)
                    .unwrap_or(elapsed.num_milliseconds() as f64 / 1000.0);
                elapsed_secs > self.heartbeat_timeout_secs
            }
        }
    }

    pub fn health(&self, now: DateTime<Utc>) -> StreamHealth {
        match self.last_update {
            None => StreamHealth::Unknown,
            Some(_) if self.is_timed_out(now) => StreamHealth::Stale,
            Some(_) => StreamHealth::Active,
        }
    }
}

/// Serializable snapshot of one stream at a given instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreamStatus {
    pub gocb_ref: String,
    pub app_id: u16,
    pub st_num: Option<u32>,
    pub sq_num: Option<u32>,
    pub last_update: Option<DateTime<Utc>>,
    pub timed_out: bool,
    pub health: StreamHealth,
}
