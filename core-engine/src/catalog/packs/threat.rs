//! Threat model pack
//!
//! STRIDE entries from a threat modeling session: high-risk categories,
//! impact x likelihood magnitude, missing mitigations.

use crate::artifact::{ArtifactKind, FieldMap, FieldValue};
use crate::catalog::packs::CATALOG_VERSION;
use crate::catalog::types::{
    CombineStrategy, FieldSelector, KindProfile, Predicate, Rule, RulePack, VerdictStyle, Weight,
};
use crate::severity::Severity;

const HIGH_RISK_CATEGORIES: &[&str] = &[
    "spoofing",
    "tampering",
    "information_disclosure",
    "elevation_of_privilege",
];

/// Impact x likelihood above this product needs registered tracking.
const RISK_ACCEPTANCE_LINE: f64 = 12.0;

fn derive(fields: &FieldMap) -> Vec<(String, FieldValue)> {
    let mut derived = Vec::new();
    let impact = fields.get("impact").and_then(|v| v.as_number());
    let likelihood = fields.get("likelihood").and_then(|v| v.as_number());
    if let (Some(i), Some(l)) = (impact, likelihood) {
        derived.push(("risk_product".to_string(), FieldValue::Float(i * l)));
    }
    let mitigations = fields
        .get("mitigations")
        .and_then(|v| v.as_str_list())
        .map(|m| m.len() as i64)
        .unwrap_or(0);
    derived.push(("mitigation_count".to_string(), FieldValue::Int(mitigations)));
    derived
}

pub fn pack() -> RulePack {
    let kind = ArtifactKind::Threat;
    RulePack {
        name: "threat".to_string(),
        version: CATALOG_VERSION.to_string(),
        profile: KindProfile::new(
            kind.clone(),
            CombineStrategy::SumClamped,
            VerdictStyle::HighRisk,
        ),
        rules: vec![
            Rule::new(
                "THR-001",
                kind.clone(),
                FieldSelector::field("category"),
                Predicate::in_set(HIGH_RISK_CATEGORIES),
                "category",
                Weight::Fixed(25.0),
                Severity::High,
            )
            .label("high_risk_category")
            .message("high-risk STRIDE category: {matches}"),
            Rule::new(
                "THR-002",
                kind.clone(),
                FieldSelector::field("risk_product"),
                Predicate::Outside {
                    lo: None,
                    hi: Some(RISK_ACCEPTANCE_LINE),
                },
                "magnitude",
                Weight::Scaled(4.0),
                Severity::High,
            )
            .label("high_impact")
            .observe(&["impact", "likelihood"])
            .message("impact {impact} x likelihood {likelihood} exceeds the acceptance line")
            .remediation("Track the threat on the risk register with an owning team"),
            Rule::new(
                "THR-003",
                kind.clone(),
                FieldSelector::field("mitigation_count"),
                Predicate::Equals(FieldValue::Int(0)),
                "mitigation",
                Weight::Fixed(30.0),
                Severity::High,
            )
            .label("unmitigated")
            .message("no mitigations recorded for the threat")
            .remediation("Document at least one mitigation per identified threat"),
        ],
        baselines: vec![],
        derive: Some(derive),
    }
}
