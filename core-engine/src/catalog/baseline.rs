//! Baselines
//!
//! Pre-computed statistical references the deviation predicates read.
//! Read-only for the engine's lifetime; refreshing them is an external
//! operation that rebuilds the library.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named numeric reference for one (kind, dimension) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub mean: f64,
    pub stddev: f64,
    /// Optional value distribution (e.g. port usage probabilities), exposed
    /// for diagnostics alongside the packs' membership sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<BTreeMap<String, f64>>,
}

impl Baseline {
    pub fn new(mean: f64, stddev: f64) -> Self {
        Self {
            mean,
            stddev,
            distribution: None,
        }
    }

    pub fn with_distribution(mut self, entries: &[(&str, f64)]) -> Self {
        self.distribution = Some(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        );
        self
    }

    /// z-score of an observation against this baseline. The divisor is
    /// floored at 1 so degenerate baselines cannot explode the score.
    pub fn z_score(&self, value: f64) -> f64 {
        ((value - self.mean) / self.stddev.max(1.0)).abs()
    }

    /// Ratio of an observation to the baseline mean, floored at 1.
    pub fn ratio(&self, value: f64) -> f64 {
        value / self.mean.max(1.0)
    }
}
