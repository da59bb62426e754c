//! Catalog types
//!
//! Data structures only; rule application lives in `eval`, score collapse
//! in `score`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactKind, FieldMap, FieldValue};
use crate::constants::{DEFAULT_FLAG_CUT, DEFAULT_RECOMMENDATION_CAP};
use crate::severity::Severity;

/// Which artifact field(s) a rule reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldSelector {
    /// A single named field.
    Field(String),
    /// Concatenated text haystack over the named string fields, joined with
    /// newlines. Absent components are skipped; all-absent resolves to
    /// nothing.
    JoinText(Vec<String>),
    /// Sum of the named numeric fields. Absent components are skipped;
    /// all-absent resolves to nothing.
    SumNumeric(Vec<String>),
}

impl FieldSelector {
    pub fn field(name: &str) -> Self {
        FieldSelector::Field(name.to_string())
    }

    pub fn join(names: &[&str]) -> Self {
        FieldSelector::JoinText(names.iter().map(|n| n.to_string()).collect())
    }

    pub fn sum(names: &[&str]) -> Self {
        FieldSelector::SumNumeric(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Rule predicate variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Pattern finds at least one occurrence in a string field.
    Regex(String),
    /// Lowercased field contains any of the words.
    ContainsAny(Vec<String>),
    /// Scalar membership, or non-empty intersection for list fields.
    InSet(Vec<String>),
    /// Numeric value outside [lo, hi]; open bounds supported.
    Outside { lo: Option<f64>, hi: Option<f64> },
    /// |(v - mean) / max(stddev, 1)| above the threshold, using the
    /// baseline registered under this rule's dimension.
    ZScoreAbove { threshold: f64 },
    /// v / max(baseline mean, 1) above the factor.
    RatioAbove { baseline: String, factor: f64 },
    /// Scalar equality.
    Equals(FieldValue),
    /// Hour of a timestamp field outside [start, end] (inclusive,
    /// wrap-around windows supported).
    TimeOutside { start: u32, end: u32 },
}

impl Predicate {
    pub fn contains_any(words: &[&str]) -> Self {
        Predicate::ContainsAny(words.iter().map(|w| w.to_string()).collect())
    }

    pub fn in_set(values: &[&str]) -> Self {
        Predicate::InSet(values.iter().map(|v| v.to_string()).collect())
    }

    /// Matches any value above zero. The idiom for count-style derived
    /// fields ("at least one rare port", "any critical gap").
    pub fn above_zero() -> Self {
        Predicate::Outside {
            lo: None,
            hi: Some(0.0),
        }
    }
}

/// How a match's weight is computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Weight {
    /// Match weight is the constant.
    Fixed(f64),
    /// Match weight is the constant times the predicate's observed
    /// magnitude (z value, ratio, distance outside range, matched-element
    /// count). This is how deviation-oriented domains expose the size of a
    /// deviation through the standard aggregation path.
    Scaled(f64),
}

impl Weight {
    pub fn base(&self) -> f64 {
        match self {
            Weight::Fixed(w) | Weight::Scaled(w) => *w,
        }
    }
}

/// One declarative detection rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Stable id; evaluation order is lexicographic over these.
    pub id: String,
    pub kind: ArtifactKind,
    pub selector: FieldSelector,
    pub predicate: Predicate,
    /// Subscore axis this rule contributes to.
    pub dimension: String,
    pub weight: Weight,
    /// Severity attached to a match of this rule.
    pub severity: Severity,
    /// Optional tag surfaced on the finding (e.g. "high_volume").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Message template; `{placeholder}` names resolve against the match's
    /// observed values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Remediation template contributed to the recommendation set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    /// Extra scalar/list fields copied into the match's observed values,
    /// for message templates and callers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observe: Vec<String>,
}

impl Rule {
    /// Minimal rule; packs chain the setters below.
    pub fn new(
        id: &str,
        kind: ArtifactKind,
        selector: FieldSelector,
        predicate: Predicate,
        dimension: &str,
        weight: Weight,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.to_string(),
            kind,
            selector,
            predicate,
            dimension: dimension.to_string(),
            weight,
            severity,
            label: None,
            message: None,
            remediation: None,
            observe: Vec::new(),
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn message(mut self, template: &str) -> Self {
        self.message = Some(template.to_string());
        self
    }

    pub fn remediation(mut self, template: &str) -> Self {
        self.remediation = Some(template.to_string());
        self
    }

    pub fn observe(mut self, fields: &[&str]) -> Self {
        self.observe = fields.iter().map(|f| f.to_string()).collect();
        self
    }
}

/// How dimension subscores collapse into the composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineStrategy {
    /// Worst dimension dominates.
    Max,
    /// Subscores averaged, weighted by raw dimension weight.
    WeightedMean,
    /// Plain sum, clamped. Keyword-accumulator domains.
    SumClamped,
    /// Mean of subscores times a domain constant. Deviation domains.
    MeanScaled(f64),
}

/// Vocabulary for the flagged/clear verdict per domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStyle {
    Malicious,
    Anomalous,
    NonCompliant,
    Vulnerable,
    HighRisk,
}

impl VerdictStyle {
    pub fn flagged_label(&self) -> &'static str {
        match self {
            VerdictStyle::Malicious => "malicious",
            VerdictStyle::Anomalous => "anomalous",
            VerdictStyle::NonCompliant => "non_compliant",
            VerdictStyle::Vulnerable => "vulnerable",
            VerdictStyle::HighRisk => "high_risk",
        }
    }

    pub fn clear_label(&self) -> &'static str {
        match self {
            VerdictStyle::Malicious => "clean",
            VerdictStyle::Anomalous => "normal",
            VerdictStyle::NonCompliant => "compliant",
            VerdictStyle::Vulnerable => "hardened",
            VerdictStyle::HighRisk => "acceptable",
        }
    }
}

/// Per-kind scoring profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindProfile {
    pub kind: ArtifactKind,
    pub combine: CombineStrategy,
    /// Per-dimension scale constants; dimensions not listed scale by 1.0.
    #[serde(default)]
    pub scales: BTreeMap<String, f64>,
    /// Composite cut at or above which the artifact is flagged.
    pub flag_cut: f64,
    pub verdict: VerdictStyle,
    pub recommendation_cap: usize,
}

impl KindProfile {
    pub fn new(kind: ArtifactKind, combine: CombineStrategy, verdict: VerdictStyle) -> Self {
        Self {
            kind,
            combine,
            scales: BTreeMap::new(),
            flag_cut: DEFAULT_FLAG_CUT,
            verdict,
            recommendation_cap: DEFAULT_RECOMMENDATION_CAP,
        }
    }

    pub fn scale(mut self, dimension: &str, factor: f64) -> Self {
        self.scales.insert(dimension.to_string(), factor);
        self
    }

    pub fn flag_cut(mut self, cut: f64) -> Self {
        self.flag_cut = cut;
        self
    }

    pub fn scale_for(&self, dimension: &str) -> f64 {
        self.scales.get(dimension).copied().unwrap_or(1.0)
    }
}

/// Deterministic synthetic-field derivation a pack may declare. Runs over
/// the raw field map before evaluation (e.g. compliance percentages, rare
/// port counts). Pure function of its input.
pub type DeriveFn = fn(&FieldMap) -> Vec<(String, FieldValue)>;

/// One rule pack: the complete catalog entry for one artifact kind.
#[derive(Clone)]
pub struct RulePack {
    pub name: String,
    /// Catalog version tag for this pack.
    pub version: String,
    pub profile: KindProfile,
    pub rules: Vec<Rule>,
    /// Baselines keyed by name; z-score rules look up their dimension,
    /// ratio rules their explicit baseline id.
    pub baselines: Vec<(String, crate::catalog::Baseline)>,
    pub derive: Option<DeriveFn>,
}

impl std::fmt::Debug for RulePack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulePack")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("kind", &self.profile.kind)
            .field("rules", &self.rules.len())
            .field("baselines", &self.baselines.len())
            .field("derive", &self.derive.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_defaults_to_one() {
        let profile = KindProfile::new(
            ArtifactKind::Email,
            CombineStrategy::SumClamped,
            VerdictStyle::Malicious,
        )
        .scale("spam", 0.8);
        assert_eq!(profile.scale_for("spam"), 0.8);
        assert_eq!(profile.scale_for("phishing"), 1.0);
    }

    #[test]
    fn test_verdict_labels() {
        assert_eq!(VerdictStyle::Anomalous.flagged_label(), "anomalous");
        assert_eq!(VerdictStyle::NonCompliant.clear_label(), "compliant");
    }
}
