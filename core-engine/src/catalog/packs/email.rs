//! Email pack
//!
//! Phishing, spam, and urgency language over a subject+body haystack,
//! lookalike sender domains, dangerous attachment extensions, and link
//! shorteners. Keyword-accumulator domain: subscores sum.

use crate::artifact::{ArtifactKind, FieldMap, FieldValue};
use crate::catalog::packs::CATALOG_VERSION;
use crate::catalog::types::{
    CombineStrategy, FieldSelector, KindProfile, Predicate, Rule, RulePack, VerdictStyle, Weight,
};
use crate::severity::Severity;

const PHISHING_PHRASES: &[&str] = &[
    "verify your account",
    "confirm your identity",
    "account is suspended",
    "click here",
    "unusual activity",
    "re-enter your password",
    "update your payment",
    "login to continue",
];

const URGENCY_CUES: &[&str] = &[
    "urgent",
    "immediately",
    "act now",
    "right away",
    "asap",
    "within 24 hours",
    "final notice",
];

const SPAM_WORDING: &[&str] = &[
    "winner",
    "lottery",
    "free money",
    "no cost",
    "limited time offer",
    "click below",
    "miracle",
];

const DANGEROUS_EXTENSIONS: &[&str] = &[
    ".exe", ".scr", ".bat", ".cmd", ".com", ".pif", ".js", ".vbs", ".jar", ".ps1", ".hta",
];

/// Attachment filenames reduce to their lowercased extensions so the
/// membership rule stays a plain set test.
fn derive(fields: &FieldMap) -> Vec<(String, FieldValue)> {
    let mut derived = Vec::new();
    if let Some(FieldValue::StrList(attachments)) = fields.get("attachments") {
        let extensions: Vec<String> = attachments
            .iter()
            .filter_map(|name| name.rfind('.').map(|i| name[i..].to_lowercase()))
            .collect();
        if !extensions.is_empty() {
            derived.push((
                "attachment_extensions".to_string(),
                FieldValue::StrList(extensions),
            ));
        }
    }
    derived
}

pub fn pack() -> RulePack {
    let kind = ArtifactKind::Email;
    RulePack {
        name: "email".to_string(),
        version: CATALOG_VERSION.to_string(),
        profile: KindProfile::new(kind.clone(), CombineStrategy::SumClamped, VerdictStyle::Malicious),
        rules: vec![
            Rule::new(
                "EMAIL-001",
                kind.clone(),
                FieldSelector::join(&["subject", "body"]),
                Predicate::contains_any(PHISHING_PHRASES),
                "phishing",
                Weight::Scaled(12.0),
                Severity::High,
            )
            .label("phishing_language")
            .message("phishing language detected: {matches}")
            .remediation("Warn the recipient and require out-of-band verification of the request"),
            Rule::new(
                "EMAIL-002",
                kind.clone(),
                FieldSelector::join(&["subject", "body"]),
                Predicate::contains_any(URGENCY_CUES),
                "urgency",
                Weight::Scaled(8.0),
                Severity::Medium,
            )
            .label("urgency_pressure")
            .message("urgency cues: {matches}")
            .remediation("Flag the message for user-awareness follow-up"),
            Rule::new(
                "EMAIL-003",
                kind.clone(),
                FieldSelector::join(&["subject", "body"]),
                Predicate::contains_any(SPAM_WORDING),
                "spam",
                Weight::Scaled(6.0),
                Severity::Low,
            )
            .label("spam_wording")
            .message("spam wording: {matches}"),
            Rule::new(
                "EMAIL-004",
                kind.clone(),
                FieldSelector::field("attachment_extensions"),
                Predicate::in_set(DANGEROUS_EXTENSIONS),
                "attachment",
                Weight::Fixed(25.0),
                Severity::High,
            )
            .label("dangerous_attachment")
            .message("dangerous attachment extension: {matches}")
            .remediation("Quarantine the message and strip the attachment"),
            Rule::new(
                "EMAIL-005",
                kind.clone(),
                FieldSelector::field("sender"),
                Predicate::Regex(
                    r"(?i)(paypa1|amaz0n|g00gle|micr0soft|faceb00k|verify-|-verify|secure-login|account-update)"
                        .to_string(),
                ),
                "sender",
                Weight::Fixed(20.0),
                Severity::High,
            )
            .label("suspicious_sender")
            .message("suspicious sender domain markers: {matches}")
            .remediation("Block the sending domain at the mail gateway"),
            Rule::new(
                "EMAIL-006",
                kind.clone(),
                FieldSelector::field("urls"),
                Predicate::Regex(
                    r"(?i)(bit\.ly|tinyurl\.com|goo\.gl|t\.co/|short\.ly|ow\.ly|is\.gd)".to_string(),
                ),
                "links",
                Weight::Fixed(15.0),
                Severity::Medium,
            )
            .label("shortened_url")
            .message("link shortener in message: {matches}")
            .remediation("Rewrite or expand shortened URLs before delivery"),
        ],
        baselines: vec![],
        derive: Some(derive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_extracts_extensions() {
        let mut fields = FieldMap::new();
        fields.insert(
            "attachments".to_string(),
            FieldValue::StrList(vec!["Invoice.EXE".to_string(), "notes.txt".to_string()]),
        );
        let derived = derive(&fields);
        assert_eq!(
            derived[0].1,
            FieldValue::StrList(vec![".exe".to_string(), ".txt".to_string()])
        );
    }

    #[test]
    fn test_derive_skips_missing_attachments() {
        assert!(derive(&FieldMap::new()).is_empty());
    }
}
