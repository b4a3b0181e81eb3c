use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use gmon_schemas::{ActiveLink, PacketRecord};

use crate::types::{PublisherStreamState, StreamStatus, DEFAULT_HEARTBEAT_TIMEOUT_SECS};

/// All known publisher streams, keyed by goCbRef.
///
/// BTreeMap so every derived listing iterates in a stable order. Entries
/// are created lazily by [`StreamTable::apply`] and live for the lifetime
/// of the table.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamTable {
    streams: BTreeMap<String, PublisherStreamState>,
    default_timeout_secs: f64,
}

impl Default for StreamTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamTable {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_HEARTBEAT_TIMEOUT_SECS)
    }

    /// All streams created by this table take the given heartbeat window.
    pub fn with_timeout(default_timeout_secs: f64) -> Self {
        Self {
            streams: BTreeMap::new(),
            default_timeout_secs,
        }
    }

    /// Upsert the stream for this record's goCbRef, then record the
    /// observation. The stream's app id is fixed by the first packet.
    pub fn apply(&mut self, rec: &PacketRecord) {
        let state = self
            .streams
            .entry(rec.gocb_ref.clone())
            .or_insert_with(|| {
                PublisherStreamState::with_timeout(rec.app_id, self.default_timeout_secs)
            });
        state.update(rec.st_num, rec.sq_num, rec.timestamp);
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn get(&self, gocb_ref: &str) -> Option<&PublisherStreamState> {
        self.streams.get(gocb_ref)
    }

    /// Snapshot every stream at `now`, sorted by goCbRef.
    pub fn statuses(&self, now: DateTime<Utc>) -> Vec<StreamStatus> {
        self.streams
            .iter()
            .map(|(gocb_ref, st)| StreamStatus {
                gocb_ref: gocb_ref.clone(),
                app_id: st.app_id,
                st_num: st.last_st_num,
                sq_num: st.last_sq_num,
                last_update: st.last_update,
                timed_out: st.is_timed_out(now),
                health: st.health(now),
            })
            .collect()
    }

    /// Links observable on the wire right now: one per non-timed-out
    /// stream. Traffic alone does not resolve device names.
    pub fn active_links(&self, now: DateTime<Utc>) -> Vec<ActiveLink> {
        self.streams
            .values()
            .filter(|st| !st.is_timed_out(now))
            .map(|st| ActiveLink {
                publisher: None,
                subscriber: None,
                app_id: st.app_id,
            })
            .collect()
    }
}
