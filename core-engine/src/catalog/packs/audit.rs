//! Compliance audit pack
//!
//! An audit artifact carries a framework tag and a list of assessed
//! control artifacts. Derivation collapses the control list into the
//! compliance percentage, the critical-control gap list for the
//! framework, and an evidence count; the rules then score the gaps.

use crate::artifact::{ArtifactKind, FieldMap, FieldValue};
use crate::catalog::packs::CATALOG_VERSION;
use crate::catalog::types::{
    CombineStrategy, FieldSelector, KindProfile, Predicate, Rule, RulePack, VerdictStyle, Weight,
};
use crate::constants::round2;
use crate::severity::Severity;

/// Critical control prefixes per framework. A non-compliant control whose
/// id starts with one of these is a critical gap.
const CRITICAL_CONTROLS: &[(&str, &[&str])] = &[
    ("SOC2", &["CC6.1", "CC6.2", "CC6.3", "CC7.1", "CC7.2", "CC8.1"]),
    ("ISO27001", &["A.5.15", "A.8.2", "A.8.15", "A.5.23"]),
    ("PCI-DSS", &["1.2", "3.4", "8.3", "10.2"]),
];

fn critical_prefixes(framework: &str) -> &'static [&'static str] {
    CRITICAL_CONTROLS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(framework))
        .map(|(_, prefixes)| *prefixes)
        .unwrap_or(&[])
}

fn derive(fields: &FieldMap) -> Vec<(String, FieldValue)> {
    let controls = match fields.get("controls").and_then(|v| v.as_items()) {
        Some(controls) => controls,
        None => return Vec::new(),
    };
    if controls.is_empty() {
        return vec![("control_count".to_string(), FieldValue::Int(0))];
    }

    let framework = fields
        .get("framework")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    let prefixes = critical_prefixes(framework);

    let mut compliant = 0usize;
    let mut critical_gaps: Vec<String> = Vec::new();
    let mut missing_evidence = 0i64;

    for control in controls {
        let status = control
            .field("status")
            .and_then(|v| v.as_str())
            .unwrap_or("UNKNOWN");
        match status {
            "COMPLIANT" => compliant += 1,
            "NON_COMPLIANT" => {
                if let Some(id) = control.field("id").and_then(|v| v.as_str()) {
                    if prefixes.iter().any(|p| id.starts_with(p)) {
                        critical_gaps.push(id.to_string());
                    }
                }
            }
            _ => {}
        }
        let has_evidence = control
            .field("evidence")
            .map(|v| !v.is_empty())
            .unwrap_or(false);
        if !has_evidence {
            missing_evidence += 1;
        }
    }

    let percentage = round2(compliant as f64 / controls.len() as f64 * 100.0);
    vec![
        (
            "control_count".to_string(),
            FieldValue::Int(controls.len() as i64),
        ),
        (
            "compliance_percentage".to_string(),
            FieldValue::Float(percentage),
        ),
        (
            "compliance_gap".to_string(),
            FieldValue::Float(round2(100.0 - percentage)),
        ),
        (
            "critical_gap_count".to_string(),
            FieldValue::Int(critical_gaps.len() as i64),
        ),
        ("critical_gaps".to_string(), FieldValue::StrList(critical_gaps)),
        (
            "missing_evidence".to_string(),
            FieldValue::Int(missing_evidence),
        ),
    ]
}

pub fn pack() -> RulePack {
    let kind = ArtifactKind::Audit;
    RulePack {
        name: "audit".to_string(),
        version: CATALOG_VERSION.to_string(),
        profile: KindProfile::new(
            kind.clone(),
            CombineStrategy::SumClamped,
            VerdictStyle::NonCompliant,
        ),
        rules: vec![
            Rule::new(
                "AUDIT-001",
                kind.clone(),
                FieldSelector::field("compliance_gap"),
                Predicate::above_zero(),
                "compliance",
                Weight::Scaled(1.0),
                Severity::Medium,
            )
            .label("compliance_shortfall")
            .observe(&["compliance_percentage", "control_count"])
            .message("compliance at {compliance_percentage}% across {control_count} controls")
            .remediation("Prioritize remediation plans for non-compliant controls"),
            Rule::new(
                "AUDIT-002",
                kind.clone(),
                FieldSelector::field("critical_gap_count"),
                Predicate::above_zero(),
                "critical_controls",
                Weight::Scaled(5.0),
                Severity::Critical,
            )
            .label("critical_control_gap")
            .observe(&["critical_gaps"])
            .message("{value} critical controls non-compliant: {critical_gaps}")
            .remediation("Remediate critical control gaps before the next audit window"),
            Rule::new(
                "AUDIT-003",
                kind.clone(),
                FieldSelector::field("missing_evidence"),
                Predicate::above_zero(),
                "evidence",
                Weight::Scaled(3.0),
                Severity::Medium,
            )
            .label("missing_evidence")
            .message("{value} controls supplied no evidence")
            .remediation("Collect and attach evidence for every assessed control"),
        ],
        baselines: vec![],
        derive: Some(derive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Artifact;

    fn control(id: &str, status: &str) -> Artifact {
        Artifact::new(ArtifactKind::Control, "")
            .with_field("id", FieldValue::Str(id.to_string()))
            .with_field("status", FieldValue::Str(status.to_string()))
            .with_field("evidence", FieldValue::Str("ticket-123".to_string()))
    }

    #[test]
    fn test_derive_compliance_features() {
        let mut fields = FieldMap::new();
        fields.insert("framework".to_string(), FieldValue::Str("SOC2".to_string()));
        fields.insert(
            "controls".to_string(),
            FieldValue::Items(vec![
                control("CC1.1", "COMPLIANT"),
                control("CC6.1", "NON_COMPLIANT"),
                control("CC7.1", "NON_COMPLIANT"),
                control("CC9.9", "NON_COMPLIANT"),
                control("CC2.1", "PARTIAL"),
            ]),
        );
        let derived: FieldMap = derive(&fields).into_iter().collect();
        assert_eq!(derived["compliance_percentage"], FieldValue::Float(20.0));
        assert_eq!(derived["critical_gap_count"], FieldValue::Int(2));
        assert_eq!(
            derived["critical_gaps"],
            FieldValue::StrList(vec!["CC6.1".to_string(), "CC7.1".to_string()])
        );
        assert_eq!(derived["missing_evidence"], FieldValue::Int(0));
    }

    #[test]
    fn test_unknown_framework_has_no_critical_set() {
        assert!(critical_prefixes("HOMEGROWN").is_empty());
    }
}
