use serde::{Deserialize, Serialize};

/// How a configured link and an observed link are considered the same.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Match on application id alone. The default: observed traffic carries
    /// an appId but no resolved device names.
    #[default]
    AppId,
    /// Match on `(publisher, subscriber, app_id)`. Requires a deployment
    /// where the capture side resolves names; an observed link without them
    /// can never match in this mode.
    FullTriple,
}

/// Direction of a topology mismatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    /// Configured but not observed on the wire.
    Missing,
    /// Observed on the wire but not configured.
    Unexpected,
}

/// One topology mismatch. For [`IssueKind::Missing`] the fields describe
/// the configured link (names and control reference known); for
/// [`IssueKind::Unexpected`] they describe the observed link (names
/// usually absent).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkIssue {
    pub kind: IssueKind,
    pub publisher: Option<String>,
    pub subscriber: Option<String>,
    pub app_id: u16,
    pub control_ref: Option<String>,
}
