//! Built-in rule packs
//!
//! One module per artifact kind. Packs are pure declarative data: rules,
//! baselines, a scoring profile, and optionally a derived-field function
//! for synthetic inputs (compliance percentages, rare-port counts).
//! Adding a kind means adding a module here; the evaluator and aggregator
//! never change.

pub mod audit;
pub mod behavior;
pub mod certificate;
pub mod component;
pub mod control;
pub mod email;
pub mod identity;
pub mod network_flow;
pub mod policy;
pub mod request_fingerprint;
pub mod resource_config;
pub mod rule_event;
pub mod threat;
pub mod url;

use crate::catalog::types::RulePack;

/// Catalog release tag stamped on every built-in pack.
pub const CATALOG_VERSION: &str = "2026.06";

/// The full built-in catalog.
pub fn default_packs() -> Vec<RulePack> {
    vec![
        audit::pack(),
        behavior::pack(),
        certificate::pack(),
        component::pack(),
        control::pack(),
        email::pack(),
        identity::pack(),
        network_flow::pack(),
        policy::pack(),
        request_fingerprint::pack(),
        resource_config::pack(),
        rule_event::pack(),
        threat::pack(),
        url::pack(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IndicatorLibrary;

    #[test]
    fn test_every_pack_loads() {
        let packs = default_packs();
        assert_eq!(packs.len(), 14);
        IndicatorLibrary::build(packs).unwrap();
    }

    #[test]
    fn test_pack_kinds_are_distinct() {
        let packs = default_packs();
        let mut kinds: Vec<_> = packs.iter().map(|p| p.profile.kind.clone()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), 14);
    }
}
