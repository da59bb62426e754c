//! Predicate evaluation
//!
//! One rule, one artifact, at most one match. Rules whose selector
//! resolves to a missing or empty field produce no match and no error;
//! type mismatches produce an advisory diagnostic and no match. Nothing
//! in this module can panic on caller input.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde_json::json;

use crate::artifact::{FieldMap, FieldValue};
use crate::catalog::types::{FieldSelector, Predicate, Rule, Weight};
use crate::catalog::IndicatorLibrary;
use crate::constants::{round2, MAX_OBSERVED_VALUES};
use crate::diagnostics::Diagnostic;
use crate::eval::Match;

/// Everything one evaluation pass produced.
#[derive(Debug, Default)]
pub struct EvalOutcome {
    /// In rule-id order, at most one entry per rule.
    pub matches: Vec<Match>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Evaluate a kind's full rule list against an (already derived) field map.
pub fn evaluate_rules(
    rules: &[Rule],
    library: &IndicatorLibrary,
    fields: &FieldMap,
) -> EvalOutcome {
    let mut outcome = EvalOutcome::default();
    for rule in rules {
        let (hit, mut diags) = evaluate_rule(rule, library, fields);
        if let Some(m) = hit {
            outcome.matches.push(m);
        }
        outcome.diagnostics.append(&mut diags);
    }
    outcome
}

/// Apply one rule. Returns the match (if any) and any diagnostics raised
/// along the way.
pub fn evaluate_rule(
    rule: &Rule,
    library: &IndicatorLibrary,
    fields: &FieldMap,
) -> (Option<Match>, Vec<Diagnostic>) {
    let mut diags = Vec::new();

    let hit = match &rule.predicate {
        Predicate::Regex(_) => eval_regex(rule, library, fields, &mut diags),
        Predicate::ContainsAny(words) => eval_contains_any(rule, words, fields, &mut diags),
        Predicate::InSet(values) => eval_in_set(rule, values, fields, &mut diags),
        Predicate::Outside { lo, hi } => eval_outside(rule, *lo, *hi, fields, &mut diags),
        Predicate::ZScoreAbove { threshold } => {
            eval_z_score(rule, *threshold, library, fields, &mut diags)
        }
        Predicate::RatioAbove { baseline, factor } => {
            eval_ratio(rule, baseline, *factor, library, fields, &mut diags)
        }
        Predicate::Equals(expected) => eval_equals(rule, expected, fields, &mut diags),
        Predicate::TimeOutside { start, end } => {
            eval_time_outside(rule, *start, *end, fields, &mut diags)
        }
    };

    let matched = hit.map(|(magnitude, mut observed)| {
        attach_observed_extras(rule, fields, &mut observed);
        Match {
            rule_id: rule.id.clone(),
            dimension: rule.dimension.clone(),
            severity: rule.severity,
            weight: match rule.weight {
                Weight::Fixed(w) => w,
                Weight::Scaled(w) => w * magnitude,
            },
            observed,
        }
    });

    (matched, diags)
}

// ============================================================================
// SELECTOR RESOLUTION
// ============================================================================

/// Text view of a selector: a string field, a joined string list, or a
/// newline-joined haystack over several fields. `None` when every
/// component is missing or empty.
fn resolve_text(
    rule: &Rule,
    selector: &FieldSelector,
    fields: &FieldMap,
    diags: &mut Vec<Diagnostic>,
) -> Option<String> {
    match selector {
        FieldSelector::Field(name) => {
            let value = fields.get(name)?;
            if value.is_empty() {
                return None;
            }
            text_of(value).or_else(|| {
                diags.push(Diagnostic::type_mismatch(&rule.id, name, "text"));
                None
            })
        }
        FieldSelector::JoinText(names) => {
            let parts: Vec<String> = names
                .iter()
                .filter_map(|n| fields.get(n))
                .filter(|v| !v.is_empty())
                .filter_map(text_of)
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("\n"))
            }
        }
        FieldSelector::SumNumeric(_) => {
            diags.push(Diagnostic::type_mismatch(&rule.id, "<sum>", "text"));
            None
        }
    }
}

fn text_of(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Str(s) => Some(s.clone()),
        FieldValue::StrList(items) => Some(items.join("\n")),
        _ => None,
    }
}

/// Numeric view of a selector. `None` when missing.
fn resolve_number(
    rule: &Rule,
    selector: &FieldSelector,
    fields: &FieldMap,
    diags: &mut Vec<Diagnostic>,
) -> Option<f64> {
    match selector {
        FieldSelector::Field(name) => {
            let value = fields.get(name)?;
            value.as_number().or_else(|| {
                diags.push(Diagnostic::type_mismatch(&rule.id, name, "numeric"));
                None
            })
        }
        FieldSelector::SumNumeric(names) => {
            let present: Vec<f64> = names
                .iter()
                .filter_map(|n| fields.get(n))
                .filter_map(|v| v.as_number())
                .collect();
            if present.is_empty() {
                None
            } else {
                Some(present.iter().sum())
            }
        }
        FieldSelector::JoinText(_) => {
            diags.push(Diagnostic::type_mismatch(&rule.id, "<join>", "numeric"));
            None
        }
    }
}

fn selected_field<'a>(
    selector: &FieldSelector,
    fields: &'a FieldMap,
) -> Option<(&'a str, &'a FieldValue)> {
    match selector {
        FieldSelector::Field(name) => fields
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v)),
        _ => None,
    }
}

// ============================================================================
// PREDICATES
// ============================================================================

fn eval_regex(
    rule: &Rule,
    library: &IndicatorLibrary,
    fields: &FieldMap,
    diags: &mut Vec<Diagnostic>,
) -> Option<(f64, serde_json::Value)> {
    let haystack = resolve_text(rule, &rule.selector, fields, diags)?;
    // Compiled at library build; absence here is unreachable for a built
    // library, treated as no match.
    let regex = library.regex_for(&rule.id)?;

    let mut captures: Vec<String> = Vec::new();
    for m in regex.find_iter(&haystack) {
        let text = m.as_str().to_string();
        if !captures.contains(&text) {
            captures.push(text);
        }
        if captures.len() >= MAX_OBSERVED_VALUES {
            break;
        }
    }
    if captures.is_empty() {
        return None;
    }
    let count = captures.len();
    Some((count as f64, json!({ "matches": captures, "count": count })))
}

fn eval_contains_any(
    rule: &Rule,
    words: &[String],
    fields: &FieldMap,
    diags: &mut Vec<Diagnostic>,
) -> Option<(f64, serde_json::Value)> {
    let haystack = resolve_text(rule, &rule.selector, fields, diags)?.to_lowercase();
    let matched: Vec<&String> = words
        .iter()
        .filter(|w| haystack.contains(&w.to_lowercase()))
        .collect();
    if matched.is_empty() {
        return None;
    }
    let count = matched.len();
    Some((count as f64, json!({ "matches": matched, "count": count })))
}

fn eval_in_set(
    rule: &Rule,
    values: &[String],
    fields: &FieldMap,
    diags: &mut Vec<Diagnostic>,
) -> Option<(f64, serde_json::Value)> {
    let (name, value) = selected_field(&rule.selector, fields)?;
    if value.is_empty() {
        return None;
    }
    let matched: Vec<String> = match value {
        FieldValue::Str(s) => {
            if values.iter().any(|v| v == s) {
                vec![s.clone()]
            } else {
                vec![]
            }
        }
        FieldValue::Int(i) => {
            let repr = i.to_string();
            if values.iter().any(|v| *v == repr) {
                vec![repr]
            } else {
                vec![]
            }
        }
        FieldValue::StrList(items) => items
            .iter()
            .filter(|item| values.iter().any(|v| v == *item))
            .cloned()
            .collect(),
        _ => {
            diags.push(Diagnostic::type_mismatch(&rule.id, name, "scalar or list"));
            return None;
        }
    };
    if matched.is_empty() {
        return None;
    }
    let count = matched.len();
    Some((count as f64, json!({ "matches": matched, "count": count })))
}

fn eval_outside(
    rule: &Rule,
    lo: Option<f64>,
    hi: Option<f64>,
    fields: &FieldMap,
    diags: &mut Vec<Diagnostic>,
) -> Option<(f64, serde_json::Value)> {
    let value = resolve_number(rule, &rule.selector, fields, diags)?;
    let below = lo.map(|lo| value < lo).unwrap_or(false);
    let above = hi.map(|hi| value > hi).unwrap_or(false);
    if !below && !above {
        return None;
    }
    // Distance to the violated bound is the observed magnitude.
    let magnitude = if below {
        lo.unwrap_or(0.0) - value
    } else {
        value - hi.unwrap_or(0.0)
    };
    Some((magnitude, json!({ "value": value })))
}

fn eval_z_score(
    rule: &Rule,
    threshold: f64,
    library: &IndicatorLibrary,
    fields: &FieldMap,
    diags: &mut Vec<Diagnostic>,
) -> Option<(f64, serde_json::Value)> {
    let value = resolve_number(rule, &rule.selector, fields, diags)?;
    let baseline = match library.baseline(&rule.kind, &rule.dimension) {
        Some(b) => b,
        None => {
            diags.push(Diagnostic::baseline_missing(&rule.id, &rule.dimension));
            return None;
        }
    };
    let z = baseline.z_score(value);
    if z <= threshold {
        return None;
    }
    Some((z, json!({ "value": value, "z": round2(z) })))
}

fn eval_ratio(
    rule: &Rule,
    baseline_id: &str,
    factor: f64,
    library: &IndicatorLibrary,
    fields: &FieldMap,
    diags: &mut Vec<Diagnostic>,
) -> Option<(f64, serde_json::Value)> {
    let value = resolve_number(rule, &rule.selector, fields, diags)?;
    let baseline = match library.baseline(&rule.kind, baseline_id) {
        Some(b) => b,
        None => {
            diags.push(Diagnostic::baseline_missing(&rule.id, baseline_id));
            return None;
        }
    };
    let ratio = baseline.ratio(value);
    if ratio <= factor {
        return None;
    }
    Some((ratio, json!({ "value": value, "ratio": round2(ratio) })))
}

fn eval_equals(
    rule: &Rule,
    expected: &FieldValue,
    fields: &FieldMap,
    diags: &mut Vec<Diagnostic>,
) -> Option<(f64, serde_json::Value)> {
    let (name, value) = selected_field(&rule.selector, fields)?;
    let equal = match (value, expected) {
        (FieldValue::Str(a), FieldValue::Str(b)) => a == b,
        // Numeric equality across int/float representations.
        (a, b) => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x == y,
            _ => {
                if matches!(value, FieldValue::StrList(_) | FieldValue::Items(_)) {
                    diags.push(Diagnostic::type_mismatch(&rule.id, name, "scalar"));
                }
                false
            }
        },
    };
    if !equal {
        return None;
    }
    Some((1.0, json!({ "value": json_of(value) })))
}

fn eval_time_outside(
    rule: &Rule,
    start: u32,
    end: u32,
    fields: &FieldMap,
    diags: &mut Vec<Diagnostic>,
) -> Option<(f64, serde_json::Value)> {
    let (name, value) = selected_field(&rule.selector, fields)?;
    let timestamp: DateTime<Utc> = match value {
        FieldValue::Str(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(e) => {
                diags.push(Diagnostic::malformed_field(
                    &rule.id,
                    name,
                    format!("unparsable timestamp: {}", e),
                ));
                return None;
            }
        },
        FieldValue::Int(secs) => match Utc.timestamp_opt(*secs, 0).single() {
            Some(dt) => dt,
            None => {
                diags.push(Diagnostic::malformed_field(
                    &rule.id,
                    name,
                    "epoch seconds out of range",
                ));
                return None;
            }
        },
        _ => {
            diags.push(Diagnostic::type_mismatch(&rule.id, name, "timestamp"));
            return None;
        }
    };

    let hour = timestamp.hour();
    let inside = if start <= end {
        hour >= start && hour <= end
    } else {
        // Wrap-around window, e.g. 22..6.
        hour >= start || hour <= end
    };
    if inside {
        return None;
    }
    Some((1.0, json!({ "hour": hour })))
}

// ============================================================================
// OBSERVED VALUES
// ============================================================================

/// Copy rule-declared extra fields into the observed map so message
/// templates and callers can reference them.
fn attach_observed_extras(rule: &Rule, fields: &FieldMap, observed: &mut serde_json::Value) {
    if rule.observe.is_empty() {
        return;
    }
    if let serde_json::Value::Object(map) = observed {
        for name in &rule.observe {
            if let Some(value) = fields.get(name) {
                map.insert(name.clone(), json_of(value));
            }
        }
    }
}

fn json_of(value: &FieldValue) -> serde_json::Value {
    match value {
        FieldValue::Int(v) => json!(v),
        FieldValue::Float(v) => json!(v),
        FieldValue::Str(v) => json!(v),
        FieldValue::StrList(v) => json!(v),
        FieldValue::Items(items) => json!(items.len()),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactKind;
    use crate::catalog::types::{
        CombineStrategy, KindProfile, RulePack, VerdictStyle,
    };
    use crate::catalog::Baseline;
    use crate::severity::Severity;

    fn library_with(rules: Vec<Rule>, baselines: Vec<(String, Baseline)>) -> IndicatorLibrary {
        IndicatorLibrary::build(vec![RulePack {
            name: "test".to_string(),
            version: "2026.01".to_string(),
            profile: KindProfile::new(
                ArtifactKind::NetworkFlow,
                CombineStrategy::SumClamped,
                VerdictStyle::Anomalous,
            ),
            rules,
            baselines,
            derive: None,
        }])
        .unwrap()
    }

    fn fields(entries: Vec<(&str, FieldValue)>) -> FieldMap {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn flow_rule(id: &str, selector: FieldSelector, predicate: Predicate, weight: Weight) -> Rule {
        Rule::new(
            id,
            ArtifactKind::NetworkFlow,
            selector,
            predicate,
            "bytes.z_score",
            weight,
            Severity::High,
        )
    }

    #[test]
    fn test_missing_field_no_match_no_diag() {
        let rule = flow_rule(
            "T-001",
            FieldSelector::field("absent"),
            Predicate::above_zero(),
            Weight::Fixed(5.0),
        );
        let lib = library_with(vec![rule.clone()], vec![]);
        let (hit, diags) = evaluate_rule(&rule, &lib, &fields(vec![]));
        assert!(hit.is_none());
        assert!(diags.is_empty());
    }

    #[test]
    fn test_type_mismatch_is_advisory_only() {
        let rule = flow_rule(
            "T-001",
            FieldSelector::field("count"),
            Predicate::contains_any(&["x"]),
            Weight::Fixed(5.0),
        );
        let lib = library_with(vec![rule.clone()], vec![]);
        let (hit, diags) = evaluate_rule(&rule, &lib, &fields(vec![("count", FieldValue::Int(3))]));
        assert!(hit.is_none());
        assert_eq!(diags.len(), 1);
        assert!(diags[0].is_advisory());
    }

    #[test]
    fn test_z_score_sums_selector_fields() {
        let rule = flow_rule(
            "T-001",
            FieldSelector::sum(&["bytes_sent", "bytes_received"]),
            Predicate::ZScoreAbove { threshold: 3.0 },
            Weight::Scaled(1.0),
        );
        let lib = library_with(
            vec![rule.clone()],
            vec![("bytes.z_score".to_string(), Baseline::new(5_000.0, 15_000.0))],
        );
        let f = fields(vec![
            ("bytes_sent", FieldValue::Int(400_000)),
            ("bytes_received", FieldValue::Int(200_000)),
        ]);
        let (hit, diags) = evaluate_rule(&rule, &lib, &f);
        assert!(diags.is_empty());
        let m = hit.unwrap();
        assert!((m.weight - 39.666_666).abs() < 0.001);
        assert_eq!(m.observed["z"], serde_json::json!(39.67));
    }

    #[test]
    fn test_missing_baseline_skips_rule_with_diagnostic() {
        let rule = flow_rule(
            "T-001",
            FieldSelector::field("packet_count"),
            Predicate::ZScoreAbove { threshold: 3.0 },
            Weight::Scaled(1.0),
        );
        let lib = library_with(vec![rule.clone()], vec![]);
        let (hit, diags) =
            evaluate_rule(&rule, &lib, &fields(vec![("packet_count", FieldValue::Int(9_999))]));
        assert!(hit.is_none());
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].is_advisory());
    }

    #[test]
    fn test_contains_any_records_all_matched_words() {
        let rule = flow_rule(
            "T-001",
            FieldSelector::join(&["subject", "body"]),
            Predicate::contains_any(&["urgent", "immediately", "act now"]),
            Weight::Scaled(8.0),
        );
        let lib = library_with(vec![rule.clone()], vec![]);
        let f = fields(vec![
            ("subject", FieldValue::Str("URGENT: read".to_string())),
            ("body", FieldValue::Str("Act now. Reply immediately.".to_string())),
        ]);
        let (hit, _) = evaluate_rule(&rule, &lib, &f);
        let m = hit.unwrap();
        assert_eq!(m.observed["count"], serde_json::json!(3));
        assert_eq!(m.weight, 24.0);
    }

    #[test]
    fn test_regex_captures_dedup_and_truncate() {
        let rule = flow_rule(
            "T-001",
            FieldSelector::field("body"),
            Predicate::Regex("ab".to_string()),
            Weight::Fixed(5.0),
        );
        let lib = library_with(vec![rule.clone()], vec![]);
        let f = fields(vec![("body", FieldValue::Str("ab ab ab".to_string()))]);
        let (hit, _) = evaluate_rule(&rule, &lib, &f);
        let m = hit.unwrap();
        assert_eq!(m.observed["matches"], serde_json::json!(["ab"]));
    }

    #[test]
    fn test_in_set_intersection_over_list() {
        let rule = flow_rule(
            "T-001",
            FieldSelector::field("extensions"),
            Predicate::in_set(&[".exe", ".scr"]),
            Weight::Fixed(25.0),
        );
        let lib = library_with(vec![rule.clone()], vec![]);
        let f = fields(vec![(
            "extensions",
            FieldValue::StrList(vec![".pdf".to_string(), ".exe".to_string()]),
        )]);
        let (hit, _) = evaluate_rule(&rule, &lib, &f);
        let m = hit.unwrap();
        assert_eq!(m.observed["matches"], serde_json::json!([".exe"]));
    }

    #[test]
    fn test_outside_magnitude_scales_weight() {
        let rule = flow_rule(
            "T-001",
            FieldSelector::field("critical_gap_count"),
            Predicate::above_zero(),
            Weight::Scaled(5.0),
        );
        let lib = library_with(vec![rule.clone()], vec![]);
        let f = fields(vec![("critical_gap_count", FieldValue::Int(2))]);
        let (hit, _) = evaluate_rule(&rule, &lib, &f);
        assert_eq!(hit.unwrap().weight, 10.0);
    }

    #[test]
    fn test_time_outside_window() {
        let rule = flow_rule(
            "T-001",
            FieldSelector::field("timestamp"),
            Predicate::TimeOutside { start: 7, end: 20 },
            Weight::Fixed(1.5),
        );
        let lib = library_with(vec![rule.clone()], vec![]);

        let inside = fields(vec![(
            "timestamp",
            FieldValue::Str("2026-03-02T10:30:00Z".to_string()),
        )]);
        assert!(evaluate_rule(&rule, &lib, &inside).0.is_none());

        let outside = fields(vec![(
            "timestamp",
            FieldValue::Str("2026-03-02T03:00:00Z".to_string()),
        )]);
        let m = evaluate_rule(&rule, &lib, &outside).0.unwrap();
        assert_eq!(m.observed["hour"], serde_json::json!(3));
    }

    #[test]
    fn test_malformed_timestamp_diagnostic() {
        let rule = flow_rule(
            "T-001",
            FieldSelector::field("timestamp"),
            Predicate::TimeOutside { start: 7, end: 20 },
            Weight::Fixed(1.5),
        );
        let lib = library_with(vec![rule.clone()], vec![]);
        let f = fields(vec![("timestamp", FieldValue::Str("not-a-time".to_string()))]);
        let (hit, diags) = evaluate_rule(&rule, &lib, &f);
        assert!(hit.is_none());
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].is_advisory());
    }

    #[test]
    fn test_equals_numeric_coercion() {
        let rule = flow_rule(
            "T-001",
            FieldSelector::field("flag"),
            Predicate::Equals(FieldValue::Int(1)),
            Weight::Fixed(4.0),
        );
        let lib = library_with(vec![rule.clone()], vec![]);
        let f = fields(vec![("flag", FieldValue::Float(1.0))]);
        assert!(evaluate_rule(&rule, &lib, &f).0.is_some());
    }
}
