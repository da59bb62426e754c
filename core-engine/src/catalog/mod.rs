//! Indicator Library
//!
//! The versioned, domain-parameterized catalog of detection rules. Pure
//! declarative data: rule packs declare rules, baselines, and a scoring
//! profile per artifact kind; the library compiles and indexes them at
//! construction.

pub mod baseline;
pub mod library;
pub mod packs;
pub mod types;

pub use baseline::Baseline;
pub use library::IndicatorLibrary;
pub use types::{
    CombineStrategy, DeriveFn, FieldSelector, KindProfile, Predicate, Rule, RulePack,
    VerdictStyle, Weight,
};
