//! Request fingerprint pack
//!
//! Bot detection over a client profile: automation user agents, request
//! rate against a human baseline, cookieless sessions, header anomalies.

use crate::artifact::{ArtifactKind, FieldMap, FieldValue};
use crate::catalog::packs::CATALOG_VERSION;
use crate::catalog::types::{
    CombineStrategy, FieldSelector, KindProfile, Predicate, Rule, RulePack, VerdictStyle, Weight,
};
use crate::catalog::Baseline;
use crate::severity::Severity;

fn derive(fields: &FieldMap) -> Vec<(String, FieldValue)> {
    match fields.get("headers").and_then(|v| v.as_str_list()) {
        Some(headers) => {
            let present = headers
                .iter()
                .any(|h| h.eq_ignore_ascii_case("accept-language"));
            vec![(
                "has_accept_language".to_string(),
                FieldValue::Int(if present { 1 } else { 0 }),
            )]
        }
        None => Vec::new(),
    }
}

pub fn pack() -> RulePack {
    let kind = ArtifactKind::RequestFingerprint;
    RulePack {
        name: "request_fingerprint".to_string(),
        version: CATALOG_VERSION.to_string(),
        profile: KindProfile::new(
            kind.clone(),
            CombineStrategy::SumClamped,
            VerdictStyle::Malicious,
        )
        .scale("rate.ratio", 1.5),
        rules: vec![
            Rule::new(
                "BOT-001",
                kind.clone(),
                FieldSelector::field("user_agent"),
                Predicate::Regex(
                    r"(?i)(headlesschrome|phantomjs|selenium|puppeteer|playwright|python-requests|go-http-client|curl/|wget/)"
                        .to_string(),
                ),
                "agent",
                Weight::Fixed(35.0),
                Severity::High,
            )
            .label("automation_tool")
            .message("automation user agent: {matches}")
            .remediation("Challenge the client with a proof-of-work or CAPTCHA"),
            Rule::new(
                "BOT-002",
                kind.clone(),
                FieldSelector::field("requests_per_minute"),
                Predicate::RatioAbove {
                    baseline: "requests.rate".to_string(),
                    factor: 10.0,
                },
                "rate.ratio",
                Weight::Scaled(2.0),
                Severity::High,
            )
            .label("rate_surge")
            .message("{value} requests/minute is {ratio}x the human baseline")
            .remediation("Apply progressive rate limiting to the fingerprint"),
            Rule::new(
                "BOT-003",
                kind.clone(),
                FieldSelector::field("cookies_present"),
                Predicate::Equals(FieldValue::Int(0)),
                "session",
                Weight::Fixed(10.0),
                Severity::Low,
            )
            .label("cookieless")
            .message("client presents no session cookies"),
            Rule::new(
                "BOT-004",
                kind.clone(),
                FieldSelector::field("has_accept_language"),
                Predicate::Equals(FieldValue::Int(0)),
                "headers",
                Weight::Fixed(20.0),
                Severity::Medium,
            )
            .label("header_anomaly")
            .message("accept-language header absent from the profile")
            .remediation("Correlate the header profile with known browser fingerprints"),
        ],
        baselines: vec![("requests.rate".to_string(), Baseline::new(30.0, 15.0))],
        derive: Some(derive),
    }
}
