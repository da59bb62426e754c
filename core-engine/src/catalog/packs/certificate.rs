//! Certificate pack
//!
//! Already-parsed certificate metadata: expiry window, signature and key
//! strength, trust chain shape. Worst problem dominates, so subscores
//! combine by max.

use crate::artifact::{ArtifactKind, FieldMap, FieldValue};
use crate::catalog::packs::CATALOG_VERSION;
use crate::catalog::types::{
    CombineStrategy, FieldSelector, KindProfile, Predicate, Rule, RulePack, VerdictStyle, Weight,
};
use crate::severity::Severity;

const WEAK_SIGNATURES: &[&str] = &[
    "md2",
    "md5",
    "sha1",
    "md5WithRSAEncryption",
    "sha1WithRSAEncryption",
];

fn derive(fields: &FieldMap) -> Vec<(String, FieldValue)> {
    let issuer = fields.get("issuer").and_then(|v| v.as_str());
    let subject = fields.get("subject").and_then(|v| v.as_str());
    match (issuer, subject) {
        (Some(i), Some(s)) => {
            let self_signed = if i == s { 1 } else { 0 };
            vec![("self_signed".to_string(), FieldValue::Int(self_signed))]
        }
        _ => Vec::new(),
    }
}

pub fn pack() -> RulePack {
    let kind = ArtifactKind::Certificate;
    RulePack {
        name: "certificate".to_string(),
        version: CATALOG_VERSION.to_string(),
        // Certificates flag at 50: a lone medium-grade weakness is a
        // renewal chore, not an incident.
        profile: KindProfile::new(kind.clone(), CombineStrategy::Max, VerdictStyle::Vulnerable)
            .flag_cut(50.0),
        rules: vec![
            Rule::new(
                "CERT-001",
                kind.clone(),
                FieldSelector::field("days_until_expiry"),
                Predicate::Outside {
                    lo: Some(0.0),
                    hi: None,
                },
                "validity",
                Weight::Fixed(80.0),
                Severity::High,
            )
            .label("expired")
            .message("certificate validity expired ({value} days remaining)")
            .remediation("Rotate the certificate immediately"),
            Rule::new(
                "CERT-002",
                kind.clone(),
                FieldSelector::field("days_until_expiry"),
                Predicate::Outside {
                    lo: Some(30.0),
                    hi: None,
                },
                "validity",
                Weight::Fixed(45.0),
                Severity::Medium,
            )
            .label("expiring_soon")
            .message("certificate expires in {value} days")
            .remediation("Schedule renewal before the expiry window"),
            Rule::new(
                "CERT-003",
                kind.clone(),
                FieldSelector::field("signature_algorithm"),
                Predicate::in_set(WEAK_SIGNATURES),
                "crypto",
                Weight::Fixed(70.0),
                Severity::High,
            )
            .label("weak_signature")
            .message("weak signature algorithm: {matches}")
            .remediation("Reissue with SHA-256 or stronger"),
            Rule::new(
                "CERT-004",
                kind.clone(),
                FieldSelector::field("key_bits"),
                Predicate::Outside {
                    lo: Some(2048.0),
                    hi: None,
                },
                "crypto",
                Weight::Fixed(60.0),
                Severity::High,
            )
            .label("weak_key")
            .message("key size {value} bits below the modern minimum")
            .remediation("Generate a key of at least 2048 bits"),
            Rule::new(
                "CERT-005",
                kind.clone(),
                FieldSelector::field("self_signed"),
                Predicate::Equals(FieldValue::Int(1)),
                "trust",
                Weight::Fixed(50.0),
                Severity::Medium,
            )
            .label("self_signed")
            .observe(&["issuer"])
            .message("certificate is self-signed by {issuer}")
            .remediation("Obtain a certificate from a trusted CA"),
            Rule::new(
                "CERT-006",
                kind.clone(),
                FieldSelector::field("subject"),
                Predicate::Regex(r"^\*\.".to_string()),
                "scope",
                Weight::Fixed(20.0),
                Severity::Low,
            )
            .label("wildcard_subject")
            .message("wildcard subject {matches}"),
        ],
        baselines: vec![],
        derive: Some(derive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_signed_derivation() {
        let mut fields = FieldMap::new();
        fields.insert("issuer".to_string(), FieldValue::Str("CN=corp".to_string()));
        fields.insert("subject".to_string(), FieldValue::Str("CN=corp".to_string()));
        assert_eq!(derive(&fields)[0].1, FieldValue::Int(1));

        fields.insert(
            "issuer".to_string(),
            FieldValue::Str("CN=Trusted Root".to_string()),
        );
        assert_eq!(derive(&fields)[0].1, FieldValue::Int(0));
    }
}
