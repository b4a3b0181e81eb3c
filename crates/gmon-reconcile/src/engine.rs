use gmon_schemas::{ActiveLink, ConfiguredLink};

use crate::types::{IssueKind, LinkIssue, MatchMode};

fn links_match(conf: &ConfiguredLink, act: &ActiveLink, mode: MatchMode) -> bool {
    match mode {
        MatchMode::AppId => conf.app_id == act.app_id,
        MatchMode::FullTriple => {
            conf.app_id == act.app_id
                && act.publisher.as_deref() == Some(conf.publisher.as_str())
                && act.subscriber.as_deref() == Some(conf.subscriber.as_str())
        }
    }
}

/// Deterministic topology reconciliation:
/// - configured link with no observed counterpart => MISSING
/// - observed link with no configured counterpart => UNEXPECTED
///
/// The pairwise scan is O(n*m); substation topologies are tens of links,
/// not thousands. Issues come back sorted and deduplicated, so repeated
/// calls on unchanged inputs are identical.
pub fn reconcile(
    configured: &[ConfiguredLink],
    active: &[ActiveLink],
    mode: MatchMode,
) -> Vec<LinkIssue> {
    let mut issues: Vec<LinkIssue> = Vec::new();

    for conf in configured {
        if !active.iter().any(|act| links_match(conf, act, mode)) {
            issues.push(LinkIssue {
                kind: IssueKind::Missing,
                publisher: Some(conf.publisher.clone()),
                subscriber: Some(conf.subscriber.clone()),
                app_id: conf.app_id,
                control_ref: Some(conf.control_ref.clone()),
            });
        }
    }

    for act in active {
        if !configured.iter().any(|conf| links_match(conf, act, mode)) {
            issues.push(LinkIssue {
                kind: IssueKind::Unexpected,
                publisher: act.publisher.clone(),
                subscriber: act.subscriber.clone(),
                app_id: act.app_id,
                control_ref: None,
            });
        }
    }

    issues.sort();
    issues.dedup();
    issues
}
