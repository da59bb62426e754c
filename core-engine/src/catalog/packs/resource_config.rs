//! Cloud resource configuration pack
//!
//! Misconfiguration checks over flattened resource settings: public ACLs,
//! world-open ingress, disabled encryption and logging.

use crate::artifact::{ArtifactKind, FieldValue};
use crate::catalog::packs::CATALOG_VERSION;
use crate::catalog::types::{
    CombineStrategy, FieldSelector, KindProfile, Predicate, Rule, RulePack, VerdictStyle, Weight,
};
use crate::severity::Severity;

pub fn pack() -> RulePack {
    let kind = ArtifactKind::ResourceConfig;
    RulePack {
        name: "resource_config".to_string(),
        version: CATALOG_VERSION.to_string(),
        profile: KindProfile::new(
            kind.clone(),
            CombineStrategy::SumClamped,
            VerdictStyle::Vulnerable,
        ),
        rules: vec![
            Rule::new(
                "RES-001",
                kind.clone(),
                FieldSelector::field("acl"),
                Predicate::in_set(&["public-read", "public-read-write", "authenticated-read"]),
                "exposure",
                Weight::Fixed(40.0),
                Severity::High,
            )
            .label("public_bucket")
            .observe(&["resource_type"])
            .message("object store ACL is {matches}")
            .remediation("Set the bucket private and publish through a CDN or signed URLs"),
            Rule::new(
                "RES-002",
                kind.clone(),
                FieldSelector::field("ingress_cidrs"),
                Predicate::in_set(&["0.0.0.0/0", "::/0"]),
                "exposure",
                Weight::Fixed(35.0),
                Severity::High,
            )
            .label("open_ingress")
            .message("ingress open to {matches}")
            .remediation("Restrict ingress to known CIDR ranges or a bastion host"),
            Rule::new(
                "RES-003",
                kind.clone(),
                FieldSelector::field("encryption"),
                Predicate::in_set(&["none", "disabled"]),
                "data_protection",
                Weight::Fixed(30.0),
                Severity::Medium,
            )
            .label("unencrypted_storage")
            .message("encryption at rest is {matches}")
            .remediation("Enable default encryption with a managed key"),
            Rule::new(
                "RES-004",
                kind.clone(),
                FieldSelector::field("logging_enabled"),
                Predicate::Equals(FieldValue::Int(0)),
                "observability",
                Weight::Fixed(15.0),
                Severity::Low,
            )
            .label("logging_disabled")
            .message("access logging is disabled")
            .remediation("Enable access logging to a dedicated audit account"),
        ],
        baselines: vec![],
        derive: None,
    }
}
