//! Network flow pack
//!
//! Deviation domain: z-scores over transfer volume and packet counts, plus
//! rare destination ports and tunneling protocols. Subscores combine by
//! mean and scale by the deviation constant.

use crate::artifact::{ArtifactKind, FieldMap, FieldValue};
use crate::catalog::packs::CATALOG_VERSION;
use crate::catalog::types::{
    CombineStrategy, FieldSelector, KindProfile, Predicate, Rule, RulePack, VerdictStyle, Weight,
};
use crate::catalog::Baseline;
use crate::constants::DEVIATION_SCALE;
use crate::severity::Severity;

/// Ports common enough that their use carries no signal. Shared with the
/// behavior pack.
pub(crate) const COMMON_PORTS: &[i64] = &[
    22, 25, 53, 80, 123, 443, 993, 995, 3389, 8080, 8443,
];

fn derive(fields: &FieldMap) -> Vec<(String, FieldValue)> {
    let mut derived = Vec::new();
    if let Some(FieldValue::Int(port)) = fields.get("destination_port") {
        let rare = if COMMON_PORTS.contains(port) { 0 } else { 1 };
        derived.push(("rare_port".to_string(), FieldValue::Int(rare)));
    }
    derived
}

pub fn pack() -> RulePack {
    let kind = ArtifactKind::NetworkFlow;
    RulePack {
        name: "network_flow".to_string(),
        version: CATALOG_VERSION.to_string(),
        profile: KindProfile::new(
            kind.clone(),
            CombineStrategy::MeanScaled(DEVIATION_SCALE),
            VerdictStyle::Anomalous,
        ),
        rules: vec![
            Rule::new(
                "FLOW-001",
                kind.clone(),
                FieldSelector::sum(&["bytes_sent", "bytes_received"]),
                Predicate::ZScoreAbove { threshold: 3.0 },
                "bytes.z_score",
                Weight::Scaled(1.0),
                Severity::High,
            )
            .label("high_volume")
            .message("transfer volume {value} bytes deviates from baseline (z={z})")
            .remediation("Capture the flow for packet-level inspection and rate-limit the source"),
            Rule::new(
                "FLOW-002",
                kind.clone(),
                FieldSelector::field("packet_count"),
                Predicate::ZScoreAbove { threshold: 3.0 },
                "packets.z_score",
                Weight::Scaled(1.0),
                Severity::Medium,
            )
            .label("packet_burst")
            .message("packet count {value} deviates from baseline (z={z})"),
            Rule::new(
                "FLOW-003",
                kind.clone(),
                FieldSelector::field("rare_port"),
                Predicate::above_zero(),
                "port.rarity",
                Weight::Fixed(2.0),
                Severity::Medium,
            )
            .label("rare_port")
            .observe(&["destination_port"])
            .message("destination port {destination_port} is outside the common service set")
            .remediation("Review firewall egress policy for uncommon destination ports"),
            Rule::new(
                "FLOW-004",
                kind.clone(),
                FieldSelector::field("protocol"),
                Predicate::in_set(&["gre", "esp", "ipip", "icmp"]),
                "protocol.rarity",
                Weight::Fixed(1.5),
                Severity::Low,
            )
            .label("tunneling_protocol")
            .message("uncommon transport protocol: {matches}"),
        ],
        baselines: vec![
            (
                "bytes.z_score".to_string(),
                Baseline::new(5_000.0, 15_000.0),
            ),
            ("packets.z_score".to_string(), Baseline::new(120.0, 80.0)),
            (
                // Distribution-only reference exposed through the baseline
                // endpoint; the rare-port rule keys off COMMON_PORTS.
                "port.rarity".to_string(),
                Baseline::new(0.0, 1.0).with_distribution(&[
                    ("80", 0.41),
                    ("443", 0.38),
                    ("53", 0.11),
                    ("22", 0.04),
                    ("other", 0.06),
                ]),
            ),
        ],
        derive: Some(derive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_flags_rare_port() {
        let mut fields = FieldMap::new();
        fields.insert("destination_port".to_string(), FieldValue::Int(31337));
        assert_eq!(derive(&fields)[0].1, FieldValue::Int(1));

        fields.insert("destination_port".to_string(), FieldValue::Int(443));
        assert_eq!(derive(&fields)[0].1, FieldValue::Int(0));
    }
}
