//! Finding Composer
//!
//! Renders the externally visible result: match messages, recommendation
//! set, labels, verdict, and batch summaries. The only component that
//! allocates domain-facing strings.

pub mod composer;
pub mod types;

pub use composer::{compose, rejected, summarize};
pub use types::{BatchOutcome, Finding, MatchReport, Summary};
