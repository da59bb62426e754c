//! Match record
//!
//! A single rule firing on a single artifact. Produced by the evaluator,
//! consumed by the aggregator; the composer renders it for callers.

use serde::{Deserialize, Serialize};

use crate::severity::Severity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub rule_id: String,
    pub dimension: String,
    pub severity: Severity,
    /// Contribution to the dimension's raw score. For scaled-weight rules
    /// this already carries the observed magnitude.
    pub weight: f64,
    /// Structured observed values (matched words, z value, ratio, hour...).
    /// serde_json maps iterate sorted, so serialization is reproducible.
    pub observed: serde_json::Value,
}
