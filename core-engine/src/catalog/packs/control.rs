//! Single-control pack
//!
//! One assessed compliance control at a time; the audit pack handles the
//! whole-framework roll-up.

use crate::artifact::{ArtifactKind, FieldMap, FieldValue};
use crate::catalog::packs::CATALOG_VERSION;
use crate::catalog::types::{
    CombineStrategy, FieldSelector, KindProfile, Predicate, Rule, RulePack, VerdictStyle, Weight,
};
use crate::severity::Severity;

fn derive(fields: &FieldMap) -> Vec<(String, FieldValue)> {
    let count = match fields.get("evidence") {
        Some(FieldValue::StrList(items)) => items.len() as i64,
        Some(value) if !value.is_empty() => 1,
        _ => 0,
    };
    vec![("evidence_count".to_string(), FieldValue::Int(count))]
}

pub fn pack() -> RulePack {
    let kind = ArtifactKind::Control;
    RulePack {
        name: "control".to_string(),
        version: CATALOG_VERSION.to_string(),
        profile: KindProfile::new(
            kind.clone(),
            CombineStrategy::SumClamped,
            VerdictStyle::NonCompliant,
        ),
        rules: vec![
            Rule::new(
                "CTL-001",
                kind.clone(),
                FieldSelector::field("status"),
                Predicate::Equals(FieldValue::Str("NON_COMPLIANT".to_string())),
                "status",
                Weight::Fixed(45.0),
                Severity::High,
            )
            .label("control_failed")
            .observe(&["id"])
            .message("control {id} is non-compliant")
            .remediation("Create a remediation plan with an accountable owner"),
            Rule::new(
                "CTL-002",
                kind.clone(),
                FieldSelector::field("status"),
                Predicate::Equals(FieldValue::Str("PARTIAL".to_string())),
                "status",
                Weight::Fixed(20.0),
                Severity::Medium,
            )
            .label("partially_implemented")
            .observe(&["id"])
            .message("control {id} is only partially implemented"),
            Rule::new(
                "CTL-003",
                kind.clone(),
                FieldSelector::field("evidence_count"),
                Predicate::Equals(FieldValue::Int(0)),
                "evidence",
                Weight::Fixed(15.0),
                Severity::Medium,
            )
            .label("missing_evidence")
            .message("no evidence supplied for the control")
            .remediation("Attach auditable evidence before sign-off"),
        ],
        baselines: vec![],
        derive: Some(derive),
    }
}
