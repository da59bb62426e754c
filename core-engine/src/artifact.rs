//! Artifact model
//!
//! Typed, immutable input to the engine. An artifact is a kind tag plus a
//! map of typed field values; field iteration order is deterministic
//! (BTreeMap) so evaluations are reproducible.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Artifact kinds the catalog can register packs for.
///
/// Unrecognized tags deserialize into `Other` so they reach the engine's
/// unknown-kind rejection path instead of failing at the parse boundary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactKind {
    Email,
    Url,
    NetworkFlow,
    Certificate,
    Policy,
    Control,
    ResourceConfig,
    RuleEvent,
    Identity,
    Component,
    Threat,
    RequestFingerprint,
    Audit,
    Behavior,
    Other(String),
}

impl ArtifactKind {
    pub fn as_str(&self) -> &str {
        match self {
            ArtifactKind::Email => "EMAIL",
            ArtifactKind::Url => "URL",
            ArtifactKind::NetworkFlow => "NETWORK_FLOW",
            ArtifactKind::Certificate => "CERTIFICATE",
            ArtifactKind::Policy => "POLICY",
            ArtifactKind::Control => "CONTROL",
            ArtifactKind::ResourceConfig => "RESOURCE_CONFIG",
            ArtifactKind::RuleEvent => "RULE_EVENT",
            ArtifactKind::Identity => "IDENTITY",
            ArtifactKind::Component => "COMPONENT",
            ArtifactKind::Threat => "THREAT",
            ArtifactKind::RequestFingerprint => "REQUEST_FINGERPRINT",
            ArtifactKind::Audit => "AUDIT",
            ArtifactKind::Behavior => "BEHAVIOR",
            ArtifactKind::Other(tag) => tag.as_str(),
        }
    }
}

impl From<&str> for ArtifactKind {
    fn from(tag: &str) -> Self {
        match tag {
            "EMAIL" => ArtifactKind::Email,
            "URL" => ArtifactKind::Url,
            "NETWORK_FLOW" => ArtifactKind::NetworkFlow,
            "CERTIFICATE" => ArtifactKind::Certificate,
            "POLICY" => ArtifactKind::Policy,
            "CONTROL" => ArtifactKind::Control,
            "RESOURCE_CONFIG" => ArtifactKind::ResourceConfig,
            "RULE_EVENT" => ArtifactKind::RuleEvent,
            "IDENTITY" => ArtifactKind::Identity,
            "COMPONENT" => ArtifactKind::Component,
            "THREAT" => ArtifactKind::Threat,
            "REQUEST_FINGERPRINT" => ArtifactKind::RequestFingerprint,
            "AUDIT" => ArtifactKind::Audit,
            "BEHAVIOR" => ArtifactKind::Behavior,
            other => ArtifactKind::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ArtifactKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ArtifactKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ArtifactKind::from(tag.as_str()))
    }
}

/// A typed field value.
///
/// Timestamps arrive as RFC3339 strings or epoch-second integers and are
/// interpreted by the time predicates at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Str(String),
    StrList(Vec<String>),
    Items(Vec<Artifact>),
}

impl FieldValue {
    /// Numeric view; integers widen to f64.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_str_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::StrList(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&[Artifact]> {
        match self {
            FieldValue::Items(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Empty strings and empty lists count as absent for rule evaluation.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Str(s) => s.is_empty(),
            FieldValue::StrList(items) => items.is_empty(),
            FieldValue::Items(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// Field map shared by artifacts and derived-field functions.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// One domain-specific input to the engine. Immutable and request-scoped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    pub kind: ArtifactKind,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion, used heavily by tests.
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}
