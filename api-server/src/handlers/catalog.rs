//! Catalog handlers
//!
//! Read-only views over the indicator library: registered kinds, rule
//! metadata (predicates stay internal), and baselines.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};

use threatlens_core::{ArtifactKind, Baseline, KindInfo, RuleInfo};

use crate::{AppError, AppResult, AppState};

/// List registered artifact kinds and their scoring profiles
pub async fn kinds(State(state): State<AppState>) -> Json<Vec<KindInfo>> {
    Json(state.engine.kinds())
}

/// Rule metadata for one kind
pub async fn rules(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<Json<Vec<RuleInfo>>> {
    let kind = parse_kind(&kind);
    state
        .engine
        .list_rules(&kind)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no rule pack for kind {}", kind)))
}

/// Baselines for one kind
pub async fn baselines(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<Json<BTreeMap<String, Baseline>>> {
    let kind = parse_kind(&kind);
    state
        .engine
        .baselines(&kind)
        .map(|b| Json(b.clone()))
        .ok_or_else(|| AppError::NotFound(format!("no rule pack for kind {}", kind)))
}

fn parse_kind(tag: &str) -> ArtifactKind {
    ArtifactKind::from(tag.to_uppercase().as_str())
}
