use gmon_reconcile::*;
use gmon_schemas::{ActiveLink, ConfiguredLink};

fn configured(publisher: &str, subscriber: &str, app_id: u16) -> ConfiguredLink {
    ConfiguredLink {
        publisher: publisher.to_string(),
        subscriber: subscriber.to_string(),
        control_ref: format!("{publisher}LD0/LLN0$GO$gcb01"),
        app_id,
        dataset: format!("{publisher}LD0/LLN0$DataSet1"),
    }
}

fn observed(app_id: u16) -> ActiveLink {
    ActiveLink {
        publisher: None,
        subscriber: None,
        app_id,
    }
}

#[test]
fn scenario_substation_with_one_dead_and_one_rogue_link() {
    // Engineered topology: three protection links. On the wire we hear two
    // of them plus an appId nobody engineered.
    let engineered = vec![
        configured("IED_PROT_1", "IED_CTRL_1", 0x3001),
        configured("IED_PROT_2", "IED_CTRL_1", 0x3002),
        configured("IED_PROT_3", "IED_CTRL_2", 0x3003),
    ];
    let wire = vec![observed(0x3001), observed(0x3003), observed(0x4FFF)];

    let issues = reconcile(&engineered, &wire, MatchMode::AppId);
    assert_eq!(issues.len(), 2);

    assert_eq!(issues[0].kind, IssueKind::Missing);
    assert_eq!(issues[0].publisher.as_deref(), Some("IED_PROT_2"));
    assert_eq!(issues[0].app_id, 0x3002);

    assert_eq!(issues[1].kind, IssueKind::Unexpected);
    assert_eq!(issues[1].app_id, 0x4FFF);
    assert_eq!(issues[1].publisher, None);

    // Running it again against the same inputs changes nothing.
    assert_eq!(issues, reconcile(&engineered, &wire, MatchMode::AppId));
}

#[test]
fn scenario_match_mode_changes_the_verdict() {
    let engineered = vec![configured("IED_PROT_1", "IED_CTRL_1", 0x3001)];
    let wire = vec![observed(0x3001)];

    // AppId mode: the wire accounts for the configured link.
    assert!(reconcile(&engineered, &wire, MatchMode::AppId).is_empty());

    // FullTriple mode: a nameless observation proves nothing, so the same
    // wire state reads as one missing and one unexpected link.
    let strict = reconcile(&engineered, &wire, MatchMode::FullTriple);
    assert_eq!(strict.len(), 2);
}
