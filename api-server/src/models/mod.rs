//! Request/response envelopes

pub mod envelope;

pub use envelope::*;
