//! Aggregation algorithm
//!
//! 1. Partition matches by dimension.
//! 2. raw(d) = sum of match weights in d.
//! 3. subscore(d) = clamp(raw(d) * scale(d), 0, 100).
//! 4. composite = clamp(combine(subscores), 0, 100).
//! 5. Severity from the central ladder.
//!
//! Rounding to two decimals happens once, after clamping. Matches arrive
//! in rule-id order and subscores are computed in dimension-name order;
//! nothing else about ordering is promised.

use std::collections::BTreeMap;

use crate::catalog::types::{CombineStrategy, KindProfile};
use crate::constants::{clamp_score, round2};
use crate::error::EngineError;
use crate::eval::Match;
use crate::severity::Severity;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    /// Rounded subscore per dimension, in dimension-name order.
    pub dimensions: BTreeMap<String, f64>,
    pub composite: f64,
    pub severity: Severity,
}

pub fn aggregate(
    matches: &[Match],
    profile: &KindProfile,
    artifact_id: &str,
) -> Result<ScoreOutcome, EngineError> {
    // Raw weight sums per dimension. BTreeMap keeps dimension-name order.
    let mut raw: BTreeMap<String, f64> = BTreeMap::new();
    for m in matches {
        *raw.entry(m.dimension.clone()).or_insert(0.0) += m.weight;
    }

    let mut subscores: BTreeMap<String, f64> = BTreeMap::new();
    for (dimension, sum) in &raw {
        let scaled = clamp_score(sum * profile.scale_for(dimension));
        subscores.insert(dimension.clone(), scaled);
    }

    let combined = match profile.combine {
        CombineStrategy::Max => subscores.values().cloned().fold(0.0, f64::max),
        CombineStrategy::SumClamped => subscores.values().sum(),
        CombineStrategy::WeightedMean => {
            let total_raw: f64 = raw.values().sum();
            if total_raw <= 0.0 {
                0.0
            } else {
                subscores
                    .iter()
                    .map(|(d, s)| s * raw.get(d).copied().unwrap_or(0.0))
                    .sum::<f64>()
                    / total_raw
            }
        }
        CombineStrategy::MeanScaled(factor) => {
            if subscores.is_empty() {
                0.0
            } else {
                let mean: f64 =
                    subscores.values().sum::<f64>() / subscores.len() as f64;
                mean * factor
            }
        }
    };

    let composite = round2(clamp_score(combined));
    if !composite.is_finite() {
        return Err(EngineError::InternalInvariant {
            artifact_id: artifact_id.to_string(),
            detail: "composite score is non-finite after clamp".to_string(),
        });
    }

    let dimensions: BTreeMap<String, f64> = subscores
        .into_iter()
        .map(|(d, s)| (d, round2(s)))
        .collect();

    Ok(ScoreOutcome {
        severity: Severity::from_score(composite),
        dimensions,
        composite,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactKind;
    use crate::catalog::types::VerdictStyle;

    fn m(rule_id: &str, dimension: &str, weight: f64) -> Match {
        Match {
            rule_id: rule_id.to_string(),
            dimension: dimension.to_string(),
            severity: Severity::Medium,
            weight,
            observed: serde_json::json!({}),
        }
    }

    fn profile(combine: CombineStrategy) -> KindProfile {
        KindProfile::new(ArtifactKind::Email, combine, VerdictStyle::Malicious)
    }

    #[test]
    fn test_sum_clamped() {
        let matches = vec![
            m("A-1", "phishing", 36.0),
            m("A-2", "urgency", 24.0),
            m("A-3", "attachment", 25.0),
            m("A-4", "sender", 20.0),
        ];
        let out = aggregate(&matches, &profile(CombineStrategy::SumClamped), "a").unwrap();
        assert_eq!(out.composite, 100.0);
        assert_eq!(out.severity, Severity::Critical);
        assert_eq!(out.dimensions["phishing"], 36.0);
    }

    #[test]
    fn test_empty_matches_score_zero() {
        for combine in [
            CombineStrategy::Max,
            CombineStrategy::SumClamped,
            CombineStrategy::WeightedMean,
            CombineStrategy::MeanScaled(20.0),
        ] {
            let out = aggregate(&[], &profile(combine), "a").unwrap();
            assert_eq!(out.composite, 0.0);
            assert_eq!(out.severity, Severity::Low);
            assert!(out.dimensions.is_empty());
        }
    }

    #[test]
    fn test_max_takes_worst_dimension() {
        let matches = vec![m("A-1", "crypto", 70.0), m("A-2", "scope", 20.0)];
        let out = aggregate(&matches, &profile(CombineStrategy::Max), "a").unwrap();
        assert_eq!(out.composite, 70.0);
        assert_eq!(out.severity, Severity::High);
    }

    #[test]
    fn test_mean_scaled_deviation_domain() {
        let matches = vec![m("A-1", "bytes.z_score", 2.5), m("A-2", "port.rarity", 1.5)];
        let out = aggregate(&matches, &profile(CombineStrategy::MeanScaled(20.0)), "a").unwrap();
        // mean(2.5, 1.5) = 2.0, x20 = 40.
        assert_eq!(out.composite, 40.0);
        assert_eq!(out.severity, Severity::Medium);
    }

    #[test]
    fn test_weighted_mean_weights_by_raw() {
        let matches = vec![m("A-1", "validity", 80.0), m("A-2", "scope", 20.0)];
        let out = aggregate(&matches, &profile(CombineStrategy::WeightedMean), "a").unwrap();
        // (80*80 + 20*20) / 100 = 68
        assert_eq!(out.composite, 68.0);
    }

    #[test]
    fn test_subscore_clamped_before_combine() {
        let matches = vec![m("A-1", "phishing", 250.0)];
        let out = aggregate(&matches, &profile(CombineStrategy::SumClamped), "a").unwrap();
        assert_eq!(out.dimensions["phishing"], 100.0);
        assert_eq!(out.composite, 100.0);
    }

    #[test]
    fn test_dimension_scale_applied() {
        let p = profile(CombineStrategy::SumClamped).scale("spam", 0.5);
        let out = aggregate(&[m("A-1", "spam", 40.0)], &p, "a").unwrap();
        assert_eq!(out.dimensions["spam"], 20.0);
        assert_eq!(out.composite, 20.0);
    }

    #[test]
    fn test_adding_match_never_decreases_sum_clamped() {
        let base = vec![m("A-1", "phishing", 30.0)];
        let mut extended = base.clone();
        extended.push(m("A-2", "spam", 10.0));
        let p = profile(CombineStrategy::SumClamped);
        let before = aggregate(&base, &p, "a").unwrap().composite;
        let after = aggregate(&extended, &p, "a").unwrap().composite;
        assert!(after >= before);
    }

    #[test]
    fn test_rounding_two_decimals() {
        let out = aggregate(
            &[m("A-1", "bytes.z_score", 39.666_666)],
            &profile(CombineStrategy::Max),
            "a",
        )
        .unwrap();
        assert_eq!(out.dimensions["bytes.z_score"], 39.67);
        assert_eq!(out.composite, 39.67);
    }
}
