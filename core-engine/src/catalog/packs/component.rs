//! Software component pack
//!
//! SBOM entries: known-vulnerable releases, open CVE counts, abandonment
//! age, license risk.

use crate::artifact::{ArtifactKind, FieldMap, FieldValue};
use crate::catalog::packs::CATALOG_VERSION;
use crate::catalog::types::{
    CombineStrategy, FieldSelector, KindProfile, Predicate, Rule, RulePack, VerdictStyle, Weight,
};
use crate::severity::Severity;

const KNOWN_VULNERABLE: &[&str] = &[
    "log4j@2.14.0",
    "log4j@2.14.1",
    "log4j@2.15.0",
    "openssl@1.0.1",
    "openssl@1.0.1f",
    "struts@2.3.31",
    "xz@5.6.0",
    "xz@5.6.1",
    "node-ipc@10.1.1",
];

const RISKY_LICENSES: &[&str] = &["agpl-3.0", "sspl-1.0", "unlicensed", "unknown"];

fn derive(fields: &FieldMap) -> Vec<(String, FieldValue)> {
    let name = fields.get("name").and_then(|v| v.as_str());
    let version = fields.get("version").and_then(|v| v.as_str());
    match (name, version) {
        (Some(n), Some(v)) => vec![(
            "name_version".to_string(),
            FieldValue::Str(format!("{}@{}", n.to_lowercase(), v.to_lowercase())),
        )],
        _ => Vec::new(),
    }
}

pub fn pack() -> RulePack {
    let kind = ArtifactKind::Component;
    RulePack {
        name: "component".to_string(),
        version: CATALOG_VERSION.to_string(),
        profile: KindProfile::new(
            kind.clone(),
            CombineStrategy::SumClamped,
            VerdictStyle::Vulnerable,
        ),
        rules: vec![
            Rule::new(
                "CMP-001",
                kind.clone(),
                FieldSelector::field("name_version"),
                Predicate::in_set(KNOWN_VULNERABLE),
                "vulnerability",
                Weight::Fixed(60.0),
                Severity::Critical,
            )
            .label("known_vulnerable")
            .message("known vulnerable release: {matches}")
            .remediation("Upgrade to a patched release immediately"),
            Rule::new(
                "CMP-002",
                kind.clone(),
                FieldSelector::field("cve_count"),
                Predicate::above_zero(),
                "vulnerability",
                Weight::Scaled(12.0),
                Severity::High,
            )
            .label("open_cves")
            .message("{value} open CVEs against the component")
            .remediation("Review the CVE list and pin a fixed version"),
            Rule::new(
                "CMP-003",
                kind.clone(),
                FieldSelector::field("days_since_release"),
                Predicate::Outside {
                    lo: None,
                    hi: Some(730.0),
                },
                "maintenance",
                Weight::Fixed(25.0),
                Severity::Medium,
            )
            .label("abandoned")
            .observe(&["days_since_release"])
            .message("latest release is {days_since_release} days old")
            .remediation("Plan a migration path away from unmaintained dependencies"),
            Rule::new(
                "CMP-004",
                kind.clone(),
                FieldSelector::field("licenses"),
                Predicate::in_set(RISKY_LICENSES),
                "license",
                Weight::Fixed(20.0),
                Severity::Medium,
            )
            .label("license_risk")
            .message("restrictive or unknown licenses: {matches}")
            .remediation("Have legal review the license obligations before shipping"),
        ],
        baselines: vec![],
        derive: Some(derive),
    }
}
