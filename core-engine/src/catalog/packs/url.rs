//! URL pack
//!
//! Works over already-parsed URLs: the caller supplies `host` and `path`
//! fields; the engine never fetches or parses full URLs itself.

use crate::artifact::{ArtifactKind, FieldMap, FieldValue};
use crate::catalog::packs::CATALOG_VERSION;
use crate::catalog::types::{
    CombineStrategy, FieldSelector, KindProfile, Predicate, Rule, RulePack, VerdictStyle, Weight,
};
use crate::severity::Severity;

const LURE_PATH_KEYWORDS: &[&str] = &[
    "login", "verify", "account", "secure", "update", "signin", "banking", "password",
];

fn derive(fields: &FieldMap) -> Vec<(String, FieldValue)> {
    let mut derived = Vec::new();
    if let Some(FieldValue::Str(host)) = fields.get("host") {
        let depth = host.matches('.').count() as i64;
        derived.push(("subdomain_depth".to_string(), FieldValue::Int(depth)));
    }
    derived
}

pub fn pack() -> RulePack {
    let kind = ArtifactKind::Url;
    RulePack {
        name: "url".to_string(),
        version: CATALOG_VERSION.to_string(),
        profile: KindProfile::new(kind.clone(), CombineStrategy::SumClamped, VerdictStyle::Malicious),
        rules: vec![
            Rule::new(
                "URL-001",
                kind.clone(),
                FieldSelector::field("host"),
                Predicate::Regex(r"^\d{1,3}(\.\d{1,3}){3}$".to_string()),
                "host",
                Weight::Fixed(30.0),
                Severity::High,
            )
            .label("ip_literal_host")
            .message("host is a raw IP literal: {matches}")
            .remediation("Block navigation and verify the destination against an allowlist"),
            Rule::new(
                "URL-002",
                kind.clone(),
                FieldSelector::field("host"),
                Predicate::Regex(r"(?i)(^|\.)xn--".to_string()),
                "host",
                Weight::Fixed(25.0),
                Severity::High,
            )
            .label("punycode_host")
            .message("punycode hostname segment: {matches}")
            .remediation("Render the decoded hostname to the user before allowing the click"),
            Rule::new(
                "URL-003",
                kind.clone(),
                FieldSelector::field("path"),
                Predicate::contains_any(LURE_PATH_KEYWORDS),
                "path",
                Weight::Scaled(8.0),
                Severity::Medium,
            )
            .label("credential_lure")
            .message("credential-harvesting path keywords: {matches}"),
            Rule::new(
                "URL-004",
                kind.clone(),
                FieldSelector::field("host"),
                Predicate::Regex(r"\.(tk|ml|ga|cf|gq|zip|mov|country)$".to_string()),
                "host",
                Weight::Fixed(20.0),
                Severity::Medium,
            )
            .label("suspicious_tld")
            .message("suspicious top-level domain: {matches}"),
            Rule::new(
                "URL-005",
                kind.clone(),
                FieldSelector::field("subdomain_depth"),
                Predicate::Outside {
                    lo: None,
                    hi: Some(3.0),
                },
                "structure",
                Weight::Scaled(6.0),
                Severity::Low,
            )
            .label("deep_subdomains")
            .observe(&["host"])
            .message("unusually deep subdomain nesting in {host}"),
        ],
        baselines: vec![],
        derive: Some(derive),
    }
}
