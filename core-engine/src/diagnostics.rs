//! Evaluation diagnostics
//!
//! Recoverable conditions downgrade results instead of aborting them.
//! Finding-visible diagnostics (malformed field, missing baseline) ride on
//! the finding; advisory entries (type mismatches) are routed to the log
//! sink and never reach the caller.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    /// A field value failed its declared shape (e.g. unparsable timestamp).
    MalformedField,
    /// A rule references a baseline that is not loaded; the rule was skipped.
    BaselineMissing,
    /// A rule selector resolved to a value of the wrong type. Advisory only.
    TypeMismatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub detail: String,
}

impl Diagnostic {
    pub fn malformed_field(rule_id: &str, field: &str, detail: impl Into<String>) -> Self {
        Self {
            code: DiagnosticCode::MalformedField,
            rule_id: Some(rule_id.to_string()),
            field: Some(field.to_string()),
            detail: detail.into(),
        }
    }

    pub fn baseline_missing(rule_id: &str, baseline: &str) -> Self {
        Self {
            code: DiagnosticCode::BaselineMissing,
            rule_id: Some(rule_id.to_string()),
            field: None,
            detail: format!("baseline {} not loaded; rule skipped", baseline),
        }
    }

    pub fn type_mismatch(rule_id: &str, field: &str, expected: &str) -> Self {
        Self {
            code: DiagnosticCode::TypeMismatch,
            rule_id: Some(rule_id.to_string()),
            field: Some(field.to_string()),
            detail: format!("expected {} value", expected),
        }
    }

    /// Advisory diagnostics are logged, not attached to the finding.
    pub fn is_advisory(&self) -> bool {
        self.code == DiagnosticCode::TypeMismatch
    }
}
