//! gmon-report
//!
//! Assembles the operator-facing link report from the other engines'
//! outputs. Pure aggregation: nothing here inspects packets or mutates
//! state, so a report can be generated as often as callers like.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use gmon_anomaly::AnomalyRecord;
use gmon_reconcile::{IssueKind, LinkIssue};
use gmon_schemas::ConfiguredLink;
use gmon_stream::StreamStatus;
use serde::{Deserialize, Serialize};

/// One currently-publishing stream as shown to operators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivePublisher {
    pub gocb_ref: String,
    pub app_id: u16,
    pub last_update: Option<DateTime<Utc>>,
    pub st_num: Option<u32>,
    pub sq_num: Option<u32>,
}

/// Headline numbers for the dashboard row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_configured: usize,
    pub active_connections: usize,
    pub missing_connections: usize,
    pub unexpected_connections: usize,
}

/// Finding tallies keyed by the enum string names, sorted for stable
/// output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyCounts {
    pub by_severity: BTreeMap<String, usize>,
    pub by_kind: BTreeMap<String, usize>,
}

/// The full health picture handed to reporting collaborators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkReport {
    pub timestamp: DateTime<Utc>,
    pub active_publishers: Vec<ActivePublisher>,
    pub configured_connections: Vec<ConfiguredLink>,
    pub issues: Vec<LinkIssue>,
    pub anomalies: Vec<AnomalyRecord>,
    pub anomaly_counts: AnomalyCounts,
    pub summary: ReportSummary,
}

/// Build the report for one instant.
///
/// `statuses` should be a snapshot taken at the same `now`; streams whose
/// heartbeat window has elapsed are excluded from `active_publishers` but
/// still show up indirectly through the reconciliation issues.
pub fn build_link_report(
    now: DateTime<Utc>,
    statuses: &[StreamStatus],
    configured: &[ConfiguredLink],
    issues: &[LinkIssue],
    anomalies: &[AnomalyRecord],
) -> LinkReport {
    let active_publishers: Vec<ActivePublisher> = statuses
        .iter()
        .filter(|s| !s.timed_out)
        .map(|s| ActivePublisher {
            gocb_ref: s.gocb_ref.clone(),
            app_id: s.app_id,
            last_update: s.last_update,
            st_num: s.st_num,
            sq_num: s.sq_num,
        })
        .collect();

    let missing_connections = issues.iter().filter(|i| i.kind == IssueKind::Missing).count();
    let unexpected_connections = issues
        .iter()
        .filter(|i| i.kind == IssueKind::Unexpected)
        .count();

    let mut counts = AnomalyCounts::default();
    for a in anomalies {
        *counts
            .by_severity
            .entry(a.severity.as_str().to_string())
            .or_insert(0) += 1;
        *counts.by_kind.entry(a.kind.as_str().to_string()).or_insert(0) += 1;
    }

    let summary = ReportSummary {
        total_configured: configured.len(),
        active_connections: active_publishers.len(),
        missing_connections,
        unexpected_connections,
    };

    LinkReport {
        timestamp: now,
        active_publishers,
        configured_connections: configured.to_vec(),
        issues: issues.to_vec(),
        anomalies: anomalies.to_vec(),
        anomaly_counts: counts,
        summary,
    }
}
