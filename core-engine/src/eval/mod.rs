//! Rule Evaluator
//!
//! Applies one rule to one artifact and yields at most one match.
//! Deterministic, side-effect-free, and domain-agnostic: everything
//! domain-specific lives in the catalog.

pub mod evaluator;
pub mod types;

pub use evaluator::{evaluate_rule, evaluate_rules, EvalOutcome};
pub use types::Match;
