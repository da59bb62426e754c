//! Finding types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactKind;
use crate::diagnostics::Diagnostic;
use crate::severity::Severity;

/// A match as rendered for callers: the evaluator's record plus the
/// composed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub rule_id: String,
    pub dimension: String,
    pub severity: Severity,
    pub message: String,
    pub observed: serde_json::Value,
}

/// The structured response for one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub artifact_id: String,
    pub kind: ArtifactKind,
    pub composite_score: f64,
    pub severity: Severity,
    /// Composite reached the kind's flag cut.
    pub flagged: bool,
    /// Domain vocabulary for the flag: "malicious"/"clean",
    /// "anomalous"/"normal", "non_compliant"/"compliant", ...
    pub verdict: String,
    /// Subscore per dimension, dimension-name order.
    pub dimensions: BTreeMap<String, f64>,
    /// Tags contributed by matched rules, rule order, deduplicated.
    pub labels: Vec<String>,
    /// Rule-id order.
    pub matches: Vec<MatchReport>,
    /// Deduplicated, ordered by descending severity then weight, capped.
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Batch roll-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    /// Counts for all four severities, always present.
    pub by_severity: BTreeMap<String, usize>,
    pub total_matches: usize,
}

/// Result of a batch evaluation; `aborted` marks a cancellation between
/// artifacts, with the findings completed so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub summary: Summary,
    pub findings: Vec<Finding>,
    pub aborted: bool,
}
