//! Request envelopes and JSON-to-artifact decoding
//!
//! The wire format is `{kind, artifact_id?, fields}`. Field values decode
//! into the core's typed model; unknown envelope fields are ignored by
//! serde, null fields are dropped, and nested object lists become nested
//! artifacts (for control lists, behavior events, and similar shapes).
//! Artifact ids are assigned here, outside the core, when the caller
//! omits them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use threatlens_core::{Artifact, ArtifactKind, FieldValue};

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(length(min = 1))]
    pub kind: String,
    pub artifact_id: Option<String>,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl AnalyzeRequest {
    pub fn into_artifact(self) -> Artifact {
        let kind = ArtifactKind::from(self.kind.as_str());
        let id = self
            .artifact_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut artifact = Artifact::new(kind.clone(), id);
        for (name, value) in self.fields {
            if let Some(field) = decode_field(&kind, &value) {
                artifact.fields.insert(name, field);
            }
        }
        artifact
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct BatchRequest {
    #[validate(length(min = 1))]
    pub items: Vec<AnalyzeRequest>,
}

/// Decode one JSON value into a typed field value. `None` drops the field
/// (nulls, empty objects, unrepresentable shapes).
fn decode_field(kind: &ArtifactKind, value: &serde_json::Value) -> Option<FieldValue> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(FieldValue::Int(if *b { 1 } else { 0 })),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(FieldValue::Int(i))
            } else {
                n.as_f64().map(FieldValue::Float)
            }
        }
        serde_json::Value::String(s) => Some(FieldValue::Str(s.clone())),
        serde_json::Value::Array(items) => decode_list(kind, items),
        serde_json::Value::Object(_) => {
            decode_item(kind, value).map(|artifact| FieldValue::Items(vec![artifact]))
        }
    }
}

fn decode_list(kind: &ArtifactKind, items: &[serde_json::Value]) -> Option<FieldValue> {
    if items.is_empty() {
        return Some(FieldValue::StrList(Vec::new()));
    }
    if items.iter().all(|v| v.is_object()) {
        let artifacts: Vec<Artifact> = items
            .iter()
            .filter_map(|v| decode_item(kind, v))
            .collect();
        return Some(FieldValue::Items(artifacts));
    }
    // Scalar lists normalize to strings; numeric members keep their
    // decimal rendering.
    let strings: Vec<String> = items
        .iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect();
    Some(FieldValue::StrList(strings))
}

/// A nested object is either an explicit envelope (`{kind?, artifact_id?,
/// fields: {...}}`) or a bare field map; bare maps inherit the parent
/// kind.
fn decode_item(parent_kind: &ArtifactKind, value: &serde_json::Value) -> Option<Artifact> {
    let object = value.as_object()?;

    let (kind, fields_object) = match object.get("fields").and_then(|f| f.as_object()) {
        Some(fields) => {
            let kind = object
                .get("kind")
                .and_then(|k| k.as_str())
                .map(ArtifactKind::from)
                .unwrap_or_else(|| parent_kind.clone());
            (kind, fields)
        }
        None => (parent_kind.clone(), object),
    };

    let id = object
        .get("artifact_id")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let mut artifact = Artifact::new(kind.clone(), id);
    for (name, nested) in fields_object {
        if name == "artifact_id" {
            continue;
        }
        if let Some(field) = decode_field(&kind, nested) {
            artifact.fields.insert(name.clone(), field);
        }
    }
    Some(artifact)
}
