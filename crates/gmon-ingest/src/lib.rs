//! gmon-ingest
//!
//! Boundary between the external capture/decode stage and the typed core.
//! Decoders hand over batches of textual field dumps ([`RawGooseRecord`]);
//! this crate turns them into [`gmon_schemas::PacketRecord`] values.
//!
//! Architectural decisions:
//! - Numeric protocol fields that fail to parse fall back to 0 (a malformed
//!   counter must not suppress the checks that run on the rest of the frame)
//! - A missing goCbRef or timestamp fails the whole batch: without the stream
//!   key or an instant to order by, nothing downstream is meaningful
//! - No capture, no dissection: frames arrive already decoded

pub mod normalizer;
pub mod raw;

pub use normalizer::{normalize, normalize_batch, NormalizeError};
pub use raw::RawGooseRecord;
