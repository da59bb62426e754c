//! Score Aggregator
//!
//! Collapses a bag of matches into dimension subscores, a bounded
//! composite score, and a severity label. Domain-agnostic; every constant
//! it applies comes from the kind profile or the central ladder.

pub mod aggregator;

pub use aggregator::{aggregate, ScoreOutcome};
