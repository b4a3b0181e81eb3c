//! gmon-stream
//!
//! Per-publisher stream state keyed by GOOSE control block reference.
//!
//! Architectural decisions:
//! - One state per goCbRef, created lazily on first packet, never evicted
//! - `update` overwrites unconditionally; counter validation lives in
//!   gmon-anomaly
//! - A stream that has never been updated reports timed out (no traffic is
//!   not health)
//! - Staleness is recoverable: the next update makes the stream active again
//!
//! Pure deterministic logic. No IO, no wall-clock. Callers provide `now`.

mod table;
mod types;

pub use table::StreamTable;
pub use types::*;
