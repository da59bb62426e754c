//! WAF rule event pack
//!
//! Scores an aggregated firewall rule event: hit-rate bursts against a
//! baseline, critical attack-class signatures, scanner user agents.

use crate::artifact::ArtifactKind;
use crate::catalog::packs::CATALOG_VERSION;
use crate::catalog::types::{
    CombineStrategy, FieldSelector, KindProfile, Predicate, Rule, RulePack, VerdictStyle, Weight,
};
use crate::catalog::Baseline;
use crate::severity::Severity;

/// Core rule set ids for injection, XSS, RCE, and LFI classes.
const CRITICAL_SIGNATURES: &[&str] = &["930100", "932100", "933100", "941100", "942100"];

pub fn pack() -> RulePack {
    let kind = ArtifactKind::RuleEvent;
    RulePack {
        name: "rule_event".to_string(),
        version: CATALOG_VERSION.to_string(),
        profile: KindProfile::new(
            kind.clone(),
            CombineStrategy::SumClamped,
            VerdictStyle::Malicious,
        ),
        rules: vec![
            Rule::new(
                "WAF-001",
                kind.clone(),
                FieldSelector::field("hit_count"),
                Predicate::RatioAbove {
                    baseline: "hits.rate".to_string(),
                    factor: 5.0,
                },
                "hits.ratio",
                Weight::Scaled(4.0),
                Severity::High,
            )
            .label("rule_burst")
            .message("rule fired {value} times, {ratio}x the baseline rate")
            .remediation("Investigate the source addresses behind the burst and rate-limit them"),
            Rule::new(
                "WAF-002",
                kind.clone(),
                FieldSelector::field("matched_rule_ids"),
                Predicate::in_set(CRITICAL_SIGNATURES),
                "attack_class",
                Weight::Fixed(45.0),
                Severity::Critical,
            )
            .label("critical_signature")
            .message("critical attack signatures matched: {matches}")
            .remediation("Escalate to incident response and confirm blocking mode for the rules"),
            Rule::new(
                "WAF-003",
                kind.clone(),
                FieldSelector::field("user_agent"),
                Predicate::Regex(
                    r"(?i)(sqlmap|nikto|nessus|masscan|nmap|dirbuster|gobuster|wpscan)".to_string(),
                ),
                "tooling",
                Weight::Fixed(35.0),
                Severity::High,
            )
            .label("scanner_agent")
            .message("known scanner user agent: {matches}")
            .remediation("Deny-list the client and review its recent requests"),
        ],
        baselines: vec![("hits.rate".to_string(), Baseline::new(40.0, 25.0))],
        derive: None,
    }
}
