//! End-to-end analyzer scenarios over the built-in catalog.

use threatlens_core::{Artifact, ArtifactKind, Engine, FieldValue, Severity};

fn engine() -> Engine {
    Engine::with_default_catalog().unwrap()
}

fn phishing_email() -> Artifact {
    Artifact::new(ArtifactKind::Email, "mail-1")
        .with_field(
            "sender",
            FieldValue::Str("security@paypa1-verify.com".to_string()),
        )
        .with_field(
            "subject",
            FieldValue::Str("URGENT: verify your account immediately".to_string()),
        )
        .with_field(
            "body",
            FieldValue::Str(
                "Your account is suspended. Click here immediately. Act now.".to_string(),
            ),
        )
        .with_field(
            "attachments",
            FieldValue::StrList(vec!["invoice.exe".to_string()]),
        )
        .with_field(
            "urls",
            FieldValue::StrList(vec!["http://short.ly/x".to_string()]),
        )
}

#[test]
fn phishing_email_scores_critical() {
    let finding = engine().evaluate(&phishing_email()).unwrap();

    assert!(finding.composite_score >= 85.0);
    assert_eq!(finding.severity, Severity::Critical);
    assert!(finding.flagged);
    assert_eq!(finding.verdict, "malicious");

    let rule_ids: Vec<&str> = finding.matches.iter().map(|m| m.rule_id.as_str()).collect();
    assert!(rule_ids.contains(&"EMAIL-001"), "phishing keywords");
    assert!(rule_ids.contains(&"EMAIL-002"), "urgency cues");
    assert!(rule_ids.contains(&"EMAIL-004"), "dangerous attachment");
    assert!(rule_ids.contains(&"EMAIL-005"), "suspicious sender");

    let phishing = finding
        .matches
        .iter()
        .find(|m| m.rule_id == "EMAIL-001")
        .unwrap();
    assert!(phishing.observed["matches"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v == "verify your account"));

    let urgency = finding
        .matches
        .iter()
        .find(|m| m.rule_id == "EMAIL-002")
        .unwrap();
    assert!(urgency.observed["count"].as_u64().unwrap() >= 3);

    let attachment = finding
        .matches
        .iter()
        .find(|m| m.rule_id == "EMAIL-004")
        .unwrap();
    assert_eq!(attachment.observed["matches"], serde_json::json!([".exe"]));

    assert!(finding
        .recommendations
        .iter()
        .any(|r| r.to_lowercase().contains("quarantine")));
}

#[test]
fn network_flow_high_volume_z_score() {
    let artifact = Artifact::new(ArtifactKind::NetworkFlow, "flow-1")
        .with_field("bytes_sent", FieldValue::Int(400_000))
        .with_field("bytes_received", FieldValue::Int(200_000))
        .with_field("packet_count", FieldValue::Int(400))
        .with_field("destination_port", FieldValue::Int(31337));

    let finding = engine().evaluate(&artifact).unwrap();

    // (600000 - 5000) / 15000 = 39.67
    assert_eq!(finding.dimensions["bytes.z_score"], 39.67);
    assert!(finding.composite_score >= 40.0);
    assert!(finding.flagged);
    assert_eq!(finding.verdict, "anomalous");
    assert_eq!(finding.labels[0], "high_volume");
    assert!(finding.labels.contains(&"rare_port".to_string()));
}

#[test]
fn audit_sixty_percent_with_two_critical_gaps() {
    let control = |id: &str, status: &str| {
        Artifact::new(ArtifactKind::Control, "")
            .with_field("id", FieldValue::Str(id.to_string()))
            .with_field("status", FieldValue::Str(status.to_string()))
            .with_field("evidence", FieldValue::Str("audit-ticket".to_string()))
    };

    let mut controls = vec![
        control("CC1.1", "COMPLIANT"),
        control("CC1.2", "COMPLIANT"),
        control("CC2.1", "COMPLIANT"),
        control("CC3.1", "COMPLIANT"),
        control("CC4.1", "COMPLIANT"),
        control("CC5.1", "COMPLIANT"),
        control("CC6.1", "NON_COMPLIANT"),
        control("CC7.1", "NON_COMPLIANT"),
        control("CC9.9", "NON_COMPLIANT"),
    ];
    controls.push(control("CC2.2", "PARTIAL"));

    let artifact = Artifact::new(ArtifactKind::Audit, "audit-1")
        .with_field("framework", FieldValue::Str("SOC2".to_string()))
        .with_field("controls", FieldValue::Items(controls));

    let finding = engine().evaluate(&artifact).unwrap();

    // gap 40 + 2 critical gaps x 5 = 50
    assert_eq!(finding.composite_score, 50.0);
    assert_eq!(finding.severity, Severity::High);
    assert!(finding.flagged);
    assert_eq!(finding.verdict, "non_compliant");

    let shortfall = finding
        .matches
        .iter()
        .find(|m| m.rule_id == "AUDIT-001")
        .unwrap();
    assert_eq!(
        shortfall.observed["compliance_percentage"],
        serde_json::json!(60.0)
    );

    let critical = finding
        .matches
        .iter()
        .find(|m| m.rule_id == "AUDIT-002")
        .unwrap();
    assert_eq!(critical.observed["critical_gaps"].as_array().unwrap().len(), 2);
}

#[test]
fn behavior_within_baseline_scores_zero() {
    let mut events = Vec::new();
    for i in 0..50 {
        events.push(
            Artifact::new(ArtifactKind::Behavior, "")
                .with_field("bytes", FieldValue::Int(800))
                .with_field(
                    "destination",
                    FieldValue::Str(format!("10.0.0.{}", i % 10)),
                )
                .with_field(
                    "port",
                    FieldValue::Int(if i % 2 == 0 { 80 } else { 443 }),
                )
                .with_field(
                    "timestamp",
                    FieldValue::Str(format!("2026-03-02T{:02}:15:00Z", 10 + (i % 8))),
                ),
        );
    }
    let artifact = Artifact::new(ArtifactKind::Behavior, "behavior-1")
        .with_field("events", FieldValue::Items(events));

    let finding = engine().evaluate(&artifact).unwrap();

    assert_eq!(finding.composite_score, 0.0);
    assert!(finding.matches.is_empty());
    assert!(finding.labels.is_empty());
    assert!(!finding.flagged);
    assert_eq!(finding.verdict, "normal");
}

#[test]
fn behavior_empty_events_short_circuits() {
    let artifact = Artifact::new(ArtifactKind::Behavior, "behavior-2")
        .with_field("events", FieldValue::Items(vec![]));

    let finding = engine().evaluate(&artifact).unwrap();

    assert_eq!(finding.composite_score, 0.0);
    assert!(finding.dimensions.is_empty());
    assert!(finding.matches.is_empty());
    assert!(finding.labels.is_empty());
}

#[test]
fn unknown_kind_is_rejected_without_error() {
    let artifact = Artifact::new(ArtifactKind::Other("UNSUPPORTED".to_string()), "x-1");
    let finding = engine().evaluate(&artifact).unwrap();

    assert_eq!(finding.severity, Severity::Low);
    assert_eq!(finding.composite_score, 0.0);
    assert_eq!(
        finding.recommendations,
        vec!["artifact kind not supported".to_string()]
    );
}

#[test]
fn expired_self_signed_certificate() {
    let artifact = Artifact::new(ArtifactKind::Certificate, "cert-1")
        .with_field("days_until_expiry", FieldValue::Int(-12))
        .with_field("signature_algorithm", FieldValue::Str("sha1".to_string()))
        .with_field("key_bits", FieldValue::Int(1024))
        .with_field("issuer", FieldValue::Str("CN=internal".to_string()))
        .with_field("subject", FieldValue::Str("CN=internal".to_string()));

    let finding = engine().evaluate(&artifact).unwrap();

    assert!(finding.flagged);
    assert_eq!(finding.verdict, "vulnerable");
    assert!(finding.labels.contains(&"expired".to_string()));
    assert!(finding.labels.contains(&"weak_signature".to_string()));
    assert!(finding.labels.contains(&"self_signed".to_string()));
    // Max combine: worst dimension carries the composite.
    assert_eq!(finding.composite_score, 100.0);
}

#[test]
fn open_policy_accumulates_findings() {
    let artifact = Artifact::new(ArtifactKind::Policy, "pol-1")
        .with_field(
            "actions",
            FieldValue::StrList(vec!["s3:*".to_string(), "iam:PassRole".to_string()]),
        )
        .with_field("resources", FieldValue::StrList(vec!["*".to_string()]))
        .with_field("principals", FieldValue::StrList(vec!["*".to_string()]));

    let finding = engine().evaluate(&artifact).unwrap();

    assert!(finding.flagged);
    assert!(finding.labels.contains(&"wildcard_action".to_string()));
    assert!(finding.labels.contains(&"public_principal".to_string()));
    assert!(finding.labels.contains(&"privilege_escalation".to_string()));
    // No conditions field at all counts as no MFA condition.
    assert!(finding.labels.contains(&"no_mfa_condition".to_string()));
}

#[test]
fn scanner_fingerprint_is_flagged() {
    let artifact = Artifact::new(ArtifactKind::RequestFingerprint, "fp-1")
        .with_field(
            "user_agent",
            FieldValue::Str("python-requests/2.31".to_string()),
        )
        .with_field("requests_per_minute", FieldValue::Int(900))
        .with_field("cookies_present", FieldValue::Int(0));

    let finding = engine().evaluate(&artifact).unwrap();

    assert!(finding.flagged);
    assert_eq!(finding.verdict, "malicious");
    assert!(finding.labels.contains(&"automation_tool".to_string()));
    assert!(finding.labels.contains(&"rate_surge".to_string()));
}
