//! Library construction and lookup
//!
//! Validates and indexes rule packs: rules sort by id, every regex
//! compiles, duplicate ids and foreign rules are rejected. Construction
//! failures abort startup; nothing here can fail at request time.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::artifact::ArtifactKind;
use crate::catalog::packs;
use crate::catalog::types::{DeriveFn, KindProfile, Predicate, Rule, RulePack};
use crate::catalog::Baseline;
use crate::error::CatalogError;

/// Default library built from the built-in packs. Packs are static data,
/// so a build failure here is a programming error.
static DEFAULT: Lazy<IndicatorLibrary> = Lazy::new(|| {
    IndicatorLibrary::build(packs::default_packs()).expect("built-in rule packs must be valid")
});

#[derive(Debug)]
struct LoadedPack {
    name: String,
    version: String,
    profile: KindProfile,
    /// Sorted by rule id.
    rules: Vec<Rule>,
    baselines: BTreeMap<String, Baseline>,
    derive: Option<DeriveFn>,
}

/// The compiled, immutable indicator library.
#[derive(Debug)]
pub struct IndicatorLibrary {
    packs: BTreeMap<ArtifactKind, LoadedPack>,
    /// Precompiled regexes keyed by rule id.
    regexes: BTreeMap<String, Regex>,
}

impl IndicatorLibrary {
    /// Validate and index a set of packs.
    pub fn build(packs: Vec<RulePack>) -> Result<Self, CatalogError> {
        let mut loaded: BTreeMap<ArtifactKind, LoadedPack> = BTreeMap::new();
        let mut regexes: BTreeMap<String, Regex> = BTreeMap::new();
        let mut seen_ids: BTreeMap<String, ()> = BTreeMap::new();

        for pack in packs {
            if pack.rules.is_empty() {
                return Err(CatalogError::EmptyPack(pack.name));
            }
            let kind = pack.profile.kind.clone();
            if let Some(existing) = loaded.get(&kind) {
                return Err(CatalogError::DuplicatePack {
                    pack: existing.name.clone(),
                    kind: kind.as_str().to_string(),
                });
            }

            let mut rules = pack.rules;
            for rule in &rules {
                if rule.kind != kind {
                    return Err(CatalogError::ForeignRule {
                        rule_id: rule.id.clone(),
                        rule_kind: rule.kind.as_str().to_string(),
                        pack: pack.name.clone(),
                        pack_kind: kind.as_str().to_string(),
                    });
                }
                if rule.weight.base() < 0.0 {
                    return Err(CatalogError::NegativeWeight {
                        rule_id: rule.id.clone(),
                    });
                }
                if seen_ids.insert(rule.id.clone(), ()).is_some() {
                    return Err(CatalogError::DuplicateRuleId(rule.id.clone()));
                }
                if let Predicate::Regex(pattern) = &rule.predicate {
                    let compiled =
                        Regex::new(pattern).map_err(|source| CatalogError::InvalidRegex {
                            rule_id: rule.id.clone(),
                            source,
                        })?;
                    regexes.insert(rule.id.clone(), compiled);
                }
            }

            // Stable evaluation order, and therefore reproducible findings.
            rules.sort_by(|a, b| a.id.cmp(&b.id));

            loaded.insert(
                kind,
                LoadedPack {
                    name: pack.name,
                    version: pack.version,
                    profile: pack.profile,
                    rules,
                    baselines: pack.baselines.into_iter().collect(),
                    derive: pack.derive,
                },
            );
        }

        Ok(Self {
            packs: loaded,
            regexes,
        })
    }

    /// Shared library over the built-in packs.
    pub fn default_library() -> &'static IndicatorLibrary {
        &DEFAULT
    }

    /// Ordered rules for a kind; `None` for unregistered kinds.
    pub fn rules_for(&self, kind: &ArtifactKind) -> Option<&[Rule]> {
        self.packs.get(kind).map(|p| p.rules.as_slice())
    }

    pub fn profile(&self, kind: &ArtifactKind) -> Option<&KindProfile> {
        self.packs.get(kind).map(|p| &p.profile)
    }

    pub fn baseline(&self, kind: &ArtifactKind, name: &str) -> Option<&Baseline> {
        self.packs.get(kind).and_then(|p| p.baselines.get(name))
    }

    pub fn baselines_for(&self, kind: &ArtifactKind) -> Option<&BTreeMap<String, Baseline>> {
        self.packs.get(kind).map(|p| &p.baselines)
    }

    pub fn derive_for(&self, kind: &ArtifactKind) -> Option<DeriveFn> {
        self.packs.get(kind).and_then(|p| p.derive)
    }

    pub fn regex_for(&self, rule_id: &str) -> Option<&Regex> {
        self.regexes.get(rule_id)
    }

    pub fn pack_name(&self, kind: &ArtifactKind) -> Option<&str> {
        self.packs.get(kind).map(|p| p.name.as_str())
    }

    pub fn pack_version(&self, kind: &ArtifactKind) -> Option<&str> {
        self.packs.get(kind).map(|p| p.version.as_str())
    }

    /// Registered kinds in deterministic order.
    pub fn kinds(&self) -> Vec<ArtifactKind> {
        self.packs.keys().cloned().collect()
    }
}
