//! Composition
//!
//! Message templating, recommendation assembly, labels, verdicts, and the
//! batch summary. Stable output ordering throughout: matches stay in
//! rule-id order, labels in rule order, recommendations sort by severity
//! then weight with a stable tie-break.

use std::collections::BTreeMap;

use crate::artifact::Artifact;
use crate::catalog::types::{KindProfile, Rule};
use crate::diagnostics::Diagnostic;
use crate::eval::Match;
use crate::finding::types::{Finding, MatchReport, Summary};
use crate::score::ScoreOutcome;
use crate::severity::Severity;

/// Render the finding for one evaluated artifact.
pub fn compose(
    artifact: &Artifact,
    rules: &[Rule],
    matches: Vec<Match>,
    score: ScoreOutcome,
    diagnostics: Vec<Diagnostic>,
    profile: &KindProfile,
) -> Finding {
    let by_id: BTreeMap<&str, &Rule> = rules.iter().map(|r| (r.id.as_str(), r)).collect();

    let mut labels: Vec<String> = Vec::new();
    let mut candidates: Vec<(Severity, f64, String)> = Vec::new();
    let mut reports: Vec<MatchReport> = Vec::with_capacity(matches.len());

    for m in matches {
        let rule = by_id.get(m.rule_id.as_str());

        if let Some(label) = rule.and_then(|r| r.label.as_deref()) {
            if !labels.iter().any(|l| l == label) {
                labels.push(label.to_string());
            }
        }
        if let Some(remediation) = rule.and_then(|r| r.remediation.as_deref()) {
            candidates.push((m.severity, m.weight, remediation.to_string()));
        }

        let message = match rule.and_then(|r| r.message.as_deref()) {
            Some(template) => render_template(template, &m.observed),
            None => format!("indicator {} triggered on {}", m.rule_id, m.dimension),
        };

        reports.push(MatchReport {
            rule_id: m.rule_id,
            dimension: m.dimension,
            severity: m.severity,
            message,
            observed: m.observed,
        });
    }

    let flagged = score.composite >= profile.flag_cut;
    let verdict = if flagged {
        profile.verdict.flagged_label()
    } else {
        profile.verdict.clear_label()
    };

    Finding {
        artifact_id: artifact.id.clone(),
        kind: artifact.kind.clone(),
        composite_score: score.composite,
        severity: score.severity,
        flagged,
        verdict: verdict.to_string(),
        dimensions: score.dimensions,
        labels,
        matches: reports,
        recommendations: assemble_recommendations(candidates, profile.recommendation_cap),
        diagnostics,
    }
}

/// Rejection finding for an artifact kind the catalog does not know.
pub fn rejected(artifact: &Artifact) -> Finding {
    Finding {
        artifact_id: artifact.id.clone(),
        kind: artifact.kind.clone(),
        composite_score: 0.0,
        severity: Severity::Low,
        flagged: false,
        verdict: "unsupported".to_string(),
        dimensions: BTreeMap::new(),
        labels: Vec::new(),
        matches: Vec::new(),
        recommendations: vec!["artifact kind not supported".to_string()],
        diagnostics: Vec::new(),
    }
}

/// Descending severity, then descending weight; `sort_by` is stable so
/// rule order breaks remaining ties. Duplicates keep their best-ranked
/// occurrence.
fn assemble_recommendations(
    mut candidates: Vec<(Severity, f64, String)>,
    cap: usize,
) -> Vec<String> {
    candidates.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then(b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal))
    });
    let mut out: Vec<String> = Vec::new();
    for (_, _, text) in candidates {
        if !out.iter().any(|existing| *existing == text) {
            out.push(text);
        }
        if out.len() >= cap {
            break;
        }
    }
    out
}

/// Substitute `{name}` placeholders from the observed value map.
/// Unresolved placeholders are left in place.
fn render_template(template: &str, observed: &serde_json::Value) -> String {
    let mut out = template.to_string();
    if let serde_json::Value::Object(map) = observed {
        for (key, value) in map {
            let placeholder = format!("{{{}}}", key);
            if out.contains(&placeholder) {
                out = out.replace(&placeholder, &display_value(value));
            }
        }
    }
    out
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 {
                    format!("{}", f as i64)
                } else {
                    format!("{}", f)
                }
            } else {
                n.to_string()
            }
        }
        serde_json::Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Batch roll-up over composed findings.
pub fn summarize(findings: &[Finding]) -> Summary {
    let mut by_severity: BTreeMap<String, usize> = [
        (Severity::Low, 0),
        (Severity::Medium, 0),
        (Severity::High, 0),
        (Severity::Critical, 0),
    ]
    .iter()
    .map(|(s, c)| (s.as_str().to_string(), *c))
    .collect();

    for finding in findings {
        *by_severity
            .entry(finding.severity.as_str().to_string())
            .or_insert(0) += 1;
    }

    Summary {
        total: findings.len(),
        by_severity,
        total_matches: findings.iter().map(|f| f.matches.len()).sum(),
    }
}
