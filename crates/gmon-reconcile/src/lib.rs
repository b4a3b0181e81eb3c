//! gmon-reconcile
//!
//! Symmetric diff between the engineered GOOSE topology and the links
//! observed on the wire.
//!
//! Architectural decisions:
//! - Mismatches are results, not errors: a quiet breaker bay is a finding
//!   for the operator, never an `Err`
//! - The match key is explicit configuration ([`MatchMode`]), because live
//!   traffic does not resolve device names on its own
//! - Output is sorted and deduplicated; identical inputs give identical
//!   issue lists
//!
//! Pure deterministic logic; no IO.

mod engine;
mod types;

pub use engine::reconcile;
pub use types::*;
