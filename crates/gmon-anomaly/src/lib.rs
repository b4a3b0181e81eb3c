//! gmon-anomaly
//!
//! Conformance and behavioral checks over batches of decoded GOOSE frames.
//!
//! Architectural decisions:
//! - Checks run per control block reference; a counter that is contiguous
//!   within its own stream never alarms because of interleaved traffic
//! - Every check family runs on every batch; one finding never suppresses
//!   another
//! - Findings are observations, not errors: the return type is a list, and
//!   an empty list is the healthy outcome
//!
//! Pure deterministic logic. No IO, no wall-clock. `analyze_batch` is the
//! only entry that mutates anything, and what it mutates is the caller's
//! stream table.

mod engine;
mod types;

pub use engine::{analyze_batch, detect};
pub use types::*;
