//! Severity ladder
//!
//! Ordinal severity derived from the composite score. The thresholds live
//! in `constants`; this module only maps scores to labels.

use serde::{Deserialize, Serialize};

use crate::constants::{SEVERITY_CRITICAL_MIN, SEVERITY_HIGH_MIN, SEVERITY_MEDIUM_MIN};

/// Severity levels, ordered LOW < MEDIUM < HIGH < CRITICAL.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Monotone step function over the composite score.
    pub fn from_score(score: f64) -> Self {
        if score >= SEVERITY_CRITICAL_MIN {
            Severity::Critical
        } else if score >= SEVERITY_HIGH_MIN {
            Severity::High
        } else if score >= SEVERITY_MEDIUM_MIN {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Severity::Low => 0,
            Severity::Medium => 1,
            Severity::High => 2,
            Severity::Critical => 3,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
