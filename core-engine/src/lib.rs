//! ThreatLens Core - Heuristic Scoring Engine
//!
//! One deterministic scoring core behind many security analyzers. A caller
//! hands the engine a typed artifact (an email, a flow record, a policy, a
//! certificate, ...); the engine runs the rule pack registered for that
//! artifact kind and returns a finding: matched indicators, a bounded
//! composite score, a severity label, and an ordered recommendation set.
//!
//! # Architecture
//!
//! ```text
//! Artifact ──▶ Indicator Library ──▶ Rule Evaluator ──▶ Score Aggregator ──▶ Finding Composer
//!              (rule packs,           (one rule, one      (matches ▶          (messages,
//!               baselines)             artifact ▶ match)   subscores ▶         recommendations,
//!                                                          composite)          labels, summary)
//! ```
//!
//! The library and baselines are immutable after construction and safe to
//! share across workers. Evaluation is synchronous, CPU-bound, and free of
//! randomness and wall-clock reads: identical inputs produce byte-identical
//! findings.

pub mod artifact;
pub mod catalog;
pub mod constants;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod eval;
pub mod finding;
pub mod score;
pub mod severity;

pub use artifact::{Artifact, ArtifactKind, FieldMap, FieldValue};
pub use catalog::{
    Baseline, CombineStrategy, FieldSelector, IndicatorLibrary, KindProfile, Predicate, Rule,
    RulePack, VerdictStyle, Weight,
};
pub use diagnostics::{Diagnostic, DiagnosticCode};
pub use engine::{Engine, KindInfo, RuleInfo};
pub use error::{CatalogError, EngineError};
pub use eval::Match;
pub use finding::{BatchOutcome, Finding, MatchReport, Summary};
pub use severity::Severity;
