//! Behavior pack
//!
//! User/host activity windows: a list of event artifacts reduces to
//! aggregate features (volume, destination spread, rare ports, off-hours
//! activity) which the deviation rules then score. An empty event list
//! derives only a zero count and scores 0.

use chrono::{DateTime, Timelike};

use crate::artifact::{ArtifactKind, FieldMap, FieldValue};
use crate::catalog::packs::network_flow::COMMON_PORTS;
use crate::catalog::packs::CATALOG_VERSION;
use crate::catalog::types::{
    CombineStrategy, FieldSelector, KindProfile, Predicate, Rule, RulePack, VerdictStyle, Weight,
};
use crate::catalog::Baseline;
use crate::constants::DEVIATION_SCALE;
use crate::severity::Severity;

/// Working window for the off-hours feature, UTC hours inclusive.
const WORK_START_HOUR: u32 = 8;
const WORK_END_HOUR: u32 = 18;

fn derive(fields: &FieldMap) -> Vec<(String, FieldValue)> {
    let events = match fields.get("events").and_then(|v| v.as_items()) {
        Some(events) => events,
        None => return Vec::new(),
    };
    if events.is_empty() {
        return vec![("event_count".to_string(), FieldValue::Int(0))];
    }

    let mut total_bytes: i64 = 0;
    let mut destinations: Vec<&str> = Vec::new();
    let mut rare_ports: i64 = 0;
    let mut off_hours: i64 = 0;

    for event in events {
        if let Some(bytes) = event.field("bytes").and_then(|v| v.as_number()) {
            total_bytes += bytes as i64;
        }
        if let Some(dest) = event.field("destination").and_then(|v| v.as_str()) {
            if !destinations.contains(&dest) {
                destinations.push(dest);
            }
        }
        if let Some(FieldValue::Int(port)) = event.field("port") {
            if !COMMON_PORTS.contains(port) {
                rare_ports += 1;
            }
        }
        if let Some(ts) = event.field("timestamp").and_then(|v| v.as_str()) {
            // Unparsable event timestamps simply don't count toward the
            // off-hours feature.
            if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
                let hour = dt.hour();
                if hour < WORK_START_HOUR || hour > WORK_END_HOUR {
                    off_hours += 1;
                }
            }
        }
    }

    vec![
        ("event_count".to_string(), FieldValue::Int(events.len() as i64)),
        ("total_bytes".to_string(), FieldValue::Int(total_bytes)),
        (
            "unique_destinations".to_string(),
            FieldValue::Int(destinations.len() as i64),
        ),
        ("rare_port_count".to_string(), FieldValue::Int(rare_ports)),
        ("off_hours_count".to_string(), FieldValue::Int(off_hours)),
    ]
}

pub fn pack() -> RulePack {
    let kind = ArtifactKind::Behavior;
    RulePack {
        name: "behavior".to_string(),
        version: CATALOG_VERSION.to_string(),
        profile: KindProfile::new(
            kind.clone(),
            CombineStrategy::MeanScaled(DEVIATION_SCALE),
            VerdictStyle::Anomalous,
        ),
        rules: vec![
            Rule::new(
                "BEHAV-001",
                kind.clone(),
                FieldSelector::field("total_bytes"),
                Predicate::RatioAbove {
                    baseline: "bytes.volume".to_string(),
                    factor: 3.0,
                },
                "volume.ratio",
                Weight::Scaled(1.0),
                Severity::High,
            )
            .label("volume_surge")
            .message("total transfer {value} bytes is {ratio}x the baseline volume")
            .remediation("Review the account's recent transfers and confirm business justification"),
            Rule::new(
                "BEHAV-002",
                kind.clone(),
                FieldSelector::field("unique_destinations"),
                Predicate::ZScoreAbove { threshold: 3.0 },
                "destinations.z_score",
                Weight::Scaled(1.0),
                Severity::Medium,
            )
            .label("destination_spread")
            .message("{value} distinct destinations contacted (z={z})"),
            Rule::new(
                "BEHAV-003",
                kind.clone(),
                FieldSelector::field("rare_port_count"),
                Predicate::above_zero(),
                "port.rarity",
                Weight::Scaled(2.0),
                Severity::Medium,
            )
            .label("rare_port")
            .message("{value} events on uncommon ports"),
            Rule::new(
                "BEHAV-004",
                kind.clone(),
                FieldSelector::field("off_hours_count"),
                Predicate::above_zero(),
                "temporal",
                Weight::Scaled(1.5),
                Severity::Medium,
            )
            .label("off_hours")
            .message("{value} events outside working hours")
            .remediation("Confirm the activity window with the account owner"),
        ],
        baselines: vec![
            ("bytes.volume".to_string(), Baseline::new(50_000.0, 20_000.0)),
            (
                "destinations.z_score".to_string(),
                Baseline::new(12.0, 6.0),
            ),
        ],
        derive: Some(derive),
    }
}
