//! Engine façade
//!
//! Wires the four layers together: select the pack for the artifact's
//! kind, derive synthetic fields, evaluate rules in id order, aggregate,
//! compose. One engine instance serves all kinds and is safe to share
//! across workers; it holds no mutable state.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::artifact::{Artifact, ArtifactKind, FieldMap};
use crate::catalog::types::CombineStrategy;
use crate::catalog::{Baseline, IndicatorLibrary, RulePack};
use crate::error::{CatalogError, EngineError};
use crate::eval;
use crate::finding::{self, BatchOutcome, Finding};
use crate::score;
use crate::severity::Severity;

/// Rule metadata exposed for diagnostics and documentation; predicates
/// stay internal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleInfo {
    pub id: String,
    pub dimension: String,
    pub severity: Severity,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub has_remediation: bool,
}

/// Per-kind catalog summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindInfo {
    pub kind: ArtifactKind,
    pub pack: String,
    pub version: String,
    pub combine: CombineStrategy,
    pub flag_cut: f64,
    pub rule_count: usize,
}

pub struct Engine {
    library: IndicatorLibrary,
}

impl Engine {
    pub fn new(library: IndicatorLibrary) -> Self {
        Self { library }
    }

    /// Engine over a custom pack set.
    pub fn from_packs(packs: Vec<RulePack>) -> Result<Self, CatalogError> {
        Ok(Self::new(IndicatorLibrary::build(packs)?))
    }

    /// Engine over the built-in packs.
    pub fn with_default_catalog() -> Result<Self, CatalogError> {
        Self::from_packs(crate::catalog::packs::default_packs())
    }

    pub fn library(&self) -> &IndicatorLibrary {
        &self.library
    }

    /// Evaluate one artifact. Unknown kinds yield a rejection finding, not
    /// an error; `Err` is reserved for internal invariant violations.
    pub fn evaluate(&self, artifact: &Artifact) -> Result<Finding, EngineError> {
        let rules = match self.library.rules_for(&artifact.kind) {
            Some(rules) => rules,
            None => {
                log::debug!("unknown artifact kind {}", artifact.kind);
                return Ok(finding::rejected(artifact));
            }
        };
        // Registered kinds always carry a profile.
        let profile = self
            .library
            .profile(&artifact.kind)
            .expect("registered kind has a profile");

        let fields = self.derived_fields(artifact);
        let outcome = eval::evaluate_rules(rules, &self.library, &fields);

        // Advisory diagnostics go to the log sink, not the finding.
        let mut visible = Vec::new();
        for diag in outcome.diagnostics {
            if diag.is_advisory() {
                log::debug!("advisory: {} ({:?})", diag.detail, diag.rule_id);
            } else {
                visible.push(diag);
            }
        }

        let scored = score::aggregate(&outcome.matches, profile, &artifact.id)?;
        Ok(finding::compose(
            artifact,
            rules,
            outcome.matches,
            scored,
            visible,
            profile,
        ))
    }

    /// Evaluate a bounded batch. The cancel flag is checked between
    /// artifacts, never mid-evaluation; on cancellation the outcome keeps
    /// the findings completed so far and sets `aborted`.
    pub fn evaluate_batch(
        &self,
        artifacts: &[Artifact],
        cancel: &AtomicBool,
    ) -> Result<BatchOutcome, EngineError> {
        let mut findings = Vec::with_capacity(artifacts.len());
        let mut aborted = false;
        for artifact in artifacts {
            if cancel.load(Ordering::Relaxed) {
                aborted = true;
                break;
            }
            findings.push(self.evaluate(artifact)?);
        }
        Ok(BatchOutcome {
            summary: finding::summarize(&findings),
            findings,
            aborted,
        })
    }

    /// Rule metadata for one kind, id order.
    pub fn list_rules(&self, kind: &ArtifactKind) -> Option<Vec<RuleInfo>> {
        self.library.rules_for(kind).map(|rules| {
            rules
                .iter()
                .map(|r| RuleInfo {
                    id: r.id.clone(),
                    dimension: r.dimension.clone(),
                    severity: r.severity,
                    weight: r.weight.base(),
                    label: r.label.clone(),
                    has_remediation: r.remediation.is_some(),
                })
                .collect()
        })
    }

    /// Read-only baseline view for one kind.
    pub fn baselines(
        &self,
        kind: &ArtifactKind,
    ) -> Option<&std::collections::BTreeMap<String, Baseline>> {
        self.library.baselines_for(kind)
    }

    /// Registered kinds with their scoring profiles.
    pub fn kinds(&self) -> Vec<KindInfo> {
        self.library
            .kinds()
            .into_iter()
            .filter_map(|kind| {
                let profile = self.library.profile(&kind)?;
                Some(KindInfo {
                    pack: self.library.pack_name(&kind)?.to_string(),
                    version: self.library.pack_version(&kind)?.to_string(),
                    combine: profile.combine,
                    flag_cut: profile.flag_cut,
                    rule_count: self.library.rules_for(&kind).map(|r| r.len())?,
                    kind,
                })
            })
            .collect()
    }

    /// Artifact fields plus the pack's derived synthetic fields. Derived
    /// names never overwrite caller-supplied fields.
    fn derived_fields(&self, artifact: &Artifact) -> FieldMap {
        let mut fields = artifact.fields.clone();
        if let Some(derive) = self.library.derive_for(&artifact.kind) {
            for (name, value) in derive(&artifact.fields) {
                fields.entry(name).or_insert(value);
            }
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::FieldValue;

    fn engine() -> Engine {
        Engine::with_default_catalog().unwrap()
    }

    #[test]
    fn test_unknown_kind_rejected_not_error() {
        let artifact = Artifact::new(ArtifactKind::Other("UNSUPPORTED".into()), "a-1");
        let finding = engine().evaluate(&artifact).unwrap();
        assert_eq!(finding.composite_score, 0.0);
        assert_eq!(finding.severity, Severity::Low);
        assert_eq!(
            finding.recommendations,
            vec!["artifact kind not supported".to_string()]
        );
        assert_eq!(finding.verdict, "unsupported");
        assert!(!finding.flagged);
    }

    #[test]
    fn test_batch_matches_single_evaluations() {
        let e = engine();
        let a = Artifact::new(ArtifactKind::Email, "a-1")
            .with_field("subject", FieldValue::Str("URGENT: verify your account".into()));
        let b = Artifact::new(ArtifactKind::Other("X".into()), "b-1");

        let cancel = AtomicBool::new(false);
        let batch = e.evaluate_batch(&[a.clone(), b.clone()], &cancel).unwrap();
        assert!(!batch.aborted);
        assert_eq!(batch.findings.len(), 2);
        assert_eq!(batch.findings[0], e.evaluate(&a).unwrap());
        assert_eq!(batch.findings[1], e.evaluate(&b).unwrap());
        assert_eq!(batch.summary.total, 2);
    }

    #[test]
    fn test_batch_cancelled_before_start_is_empty_and_aborted() {
        let e = engine();
        let a = Artifact::new(ArtifactKind::Email, "a-1");
        let cancel = AtomicBool::new(true);
        let batch = e.evaluate_batch(&[a], &cancel).unwrap();
        assert!(batch.aborted);
        assert!(batch.findings.is_empty());
    }

    #[test]
    fn test_list_rules_excludes_predicates() {
        let infos = engine().list_rules(&ArtifactKind::Email).unwrap();
        assert!(!infos.is_empty());
        // Metadata only; ids sorted.
        let ids: Vec<_> = infos.iter().map(|i| i.id.clone()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_kinds_enumerates_packs() {
        let kinds = engine().kinds();
        assert!(kinds.iter().any(|k| k.kind == ArtifactKind::Email));
        assert!(kinds.iter().any(|k| k.kind == ArtifactKind::NetworkFlow));
        assert!(kinds.iter().all(|k| k.rule_count > 0));
    }
}
