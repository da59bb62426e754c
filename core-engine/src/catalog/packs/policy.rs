//! IAM policy pack
//!
//! Structural tests over flattened policy statements: wildcard grants,
//! public principals, escalation-capable action sets, missing MFA
//! conditions.

use crate::artifact::{ArtifactKind, FieldMap, FieldValue};
use crate::catalog::packs::CATALOG_VERSION;
use crate::catalog::types::{
    CombineStrategy, FieldSelector, KindProfile, Predicate, Rule, RulePack, VerdictStyle, Weight,
};
use crate::severity::Severity;

const WILDCARD_ACTIONS: &[&str] = &["*", "iam:*", "s3:*", "ec2:*", "kms:*", "sts:*"];

const ESCALATION_ACTIONS: &[&str] = &[
    "iam:PassRole",
    "iam:CreatePolicyVersion",
    "iam:AttachUserPolicy",
    "iam:PutUserPolicy",
    "sts:AssumeRole",
    "lambda:UpdateFunctionCode",
];

fn derive(fields: &FieldMap) -> Vec<(String, FieldValue)> {
    let count = fields
        .get("conditions")
        .and_then(|v| v.as_str_list())
        .map(|conditions| {
            conditions
                .iter()
                .filter(|c| c.to_lowercase().contains("multifactorauth"))
                .count() as i64
        })
        .unwrap_or(0);
    vec![("mfa_condition_count".to_string(), FieldValue::Int(count))]
}

pub fn pack() -> RulePack {
    let kind = ArtifactKind::Policy;
    RulePack {
        name: "policy".to_string(),
        version: CATALOG_VERSION.to_string(),
        profile: KindProfile::new(
            kind.clone(),
            CombineStrategy::SumClamped,
            VerdictStyle::Vulnerable,
        ),
        rules: vec![
            Rule::new(
                "POL-001",
                kind.clone(),
                FieldSelector::field("actions"),
                Predicate::in_set(WILDCARD_ACTIONS),
                "privilege",
                Weight::Scaled(18.0),
                Severity::High,
            )
            .label("wildcard_action")
            .message("wildcard actions granted: {matches}")
            .remediation("Replace wildcard actions with the specific operations required"),
            Rule::new(
                "POL-002",
                kind.clone(),
                FieldSelector::field("resources"),
                Predicate::in_set(&["*", "arn:aws:s3:::*", "arn:aws:iam::*"]),
                "privilege",
                Weight::Fixed(25.0),
                Severity::Medium,
            )
            .label("wildcard_resource")
            .message("policy applies to all resources")
            .remediation("Scope statements to explicit resource ARNs"),
            Rule::new(
                "POL-003",
                kind.clone(),
                FieldSelector::field("principals"),
                Predicate::in_set(&["*", "anonymous"]),
                "exposure",
                Weight::Fixed(35.0),
                Severity::High,
            )
            .label("public_principal")
            .message("policy grants access to any principal")
            .remediation("Restrict the principal element to known accounts or roles"),
            Rule::new(
                "POL-004",
                kind.clone(),
                FieldSelector::field("actions"),
                Predicate::in_set(ESCALATION_ACTIONS),
                "escalation",
                Weight::Scaled(12.0),
                Severity::High,
            )
            .label("privilege_escalation")
            .message("privilege-escalation capable actions: {matches}")
            .remediation("Gate escalation-capable actions behind a permissions boundary"),
            Rule::new(
                "POL-005",
                kind.clone(),
                FieldSelector::field("mfa_condition_count"),
                Predicate::Equals(FieldValue::Int(0)),
                "authentication",
                Weight::Fixed(15.0),
                Severity::Medium,
            )
            .label("no_mfa_condition")
            .message("no multi-factor condition on the statements")
            .remediation("Require aws:MultiFactorAuthPresent on sensitive statements"),
        ],
        baselines: vec![],
        derive: Some(derive),
    }
}
