use serde::{Deserialize, Serialize};

/// A GOOSE frame as emitted by the external decoder (tshark-style JSON
/// field dump).
///
/// Every field is textual and optional: decoders emit whatever they managed
/// to dissect, and absence is normal, not a decode failure. Interpretation
/// of the text (including the permissive numeric fallback) happens in
/// [`crate::normalizer`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawGooseRecord {
    pub frame_number: Option<String>,
    /// RFC 3339 or epoch seconds (fractional allowed).
    pub timestamp: Option<String>,
    pub src_mac: Option<String>,
    pub dst_mac: Option<String>,
    /// Decimal or `0x`-prefixed hex.
    pub appid: Option<String>,
    pub gocb_ref: Option<String>,
    /// timeAllowedToLive in milliseconds.
    pub time_allowed: Option<String>,
    pub st_num: Option<String>,
    pub sq_num: Option<String>,
    pub test: Option<String>,
    pub conf_rev: Option<String>,
    pub nds_com: Option<String>,
    pub dataset: Option<String>,
    pub packet_size: Option<String>,
}
