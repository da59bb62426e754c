//! Error taxonomy
//!
//! Catalog construction fails loudly; evaluation never does except on an
//! internal invariant violation. Recoverable conditions (malformed field,
//! missing baseline) travel as diagnostics on the finding instead.

use thiserror::Error;

/// Errors raised while building the indicator library. Fatal at
/// construction, never at request time.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("rule {rule_id}: invalid regex pattern: {source}")]
    InvalidRegex {
        rule_id: String,
        #[source]
        source: regex::Error,
    },

    #[error("duplicate rule id {0}")]
    DuplicateRuleId(String),

    #[error("pack {0} declares no rules")]
    EmptyPack(String),

    #[error("pack {pack} already registered for kind {kind}")]
    DuplicatePack { pack: String, kind: String },

    #[error("rule {rule_id} targets kind {rule_kind}, but pack {pack} covers {pack_kind}")]
    ForeignRule {
        rule_id: String,
        rule_kind: String,
        pack: String,
        pack_kind: String,
    },

    #[error("rule {rule_id} carries a negative weight")]
    NegativeWeight { rule_id: String },
}

/// Fatal evaluation errors. Surfaced to the host as a structured error
/// response; never retried.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("internal invariant violated for artifact {artifact_id}: {detail}")]
    InternalInvariant { artifact_id: String, detail: String },
}
