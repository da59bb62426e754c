//! Central scoring constants
//!
//! Single source of truth for the severity ladder and scoring defaults.
//! Rule packs reference these symbolically; no pack carries its own copy
//! of a threshold.

/// Scores at or above this step are MEDIUM (below is LOW).
pub const SEVERITY_MEDIUM_MIN: f64 = 25.0;

/// Scores at or above this step are HIGH.
pub const SEVERITY_HIGH_MIN: f64 = 50.0;

/// Scores at or above this step are CRITICAL.
pub const SEVERITY_CRITICAL_MIN: f64 = 75.0;

/// Composite score at or above this cut flags the artifact
/// (malicious / anomalous / non-compliant, per kind profile).
pub const DEFAULT_FLAG_CUT: f64 = 40.0;

/// Deviation-oriented kinds (flow anomaly, behavior deviation) combine
/// subscores with a mean, then scale by this factor.
pub const DEVIATION_SCALE: f64 = 20.0;

/// Lower bound of every exposed score.
pub const SCORE_MIN: f64 = 0.0;

/// Upper bound of every exposed score.
pub const SCORE_MAX: f64 = 100.0;

/// Recommendations per finding unless the kind profile overrides it.
pub const DEFAULT_RECOMMENDATION_CAP: usize = 10;

/// Occurrences recorded per match (regex captures, matched keywords).
pub const MAX_OBSERVED_VALUES: usize = 5;

/// Clamp a score into the exposed range.
pub fn clamp_score(value: f64) -> f64 {
    value.clamp(SCORE_MIN, SCORE_MAX)
}

/// Round to two decimal places. Applied once per exposed score, after
/// clamping and before serialization.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp_score(-3.0), 0.0);
        assert_eq!(clamp_score(250.0), 100.0);
        assert_eq!(clamp_score(42.5), 42.5);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(39.666_666), 39.67);
        assert_eq!(round2(50.0), 50.0);
        assert_eq!(round2(0.004), 0.0);
    }
}
