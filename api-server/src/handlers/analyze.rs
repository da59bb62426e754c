//! Analysis handlers
//!
//! Evaluation is synchronous, CPU-bound, and sub-millisecond per
//! artifact, so it runs inline on the worker task. The engine is shared
//! read-only state; no locking.

use std::sync::atomic::AtomicBool;

use axum::{extract::State, Json};
use validator::Validate;

use threatlens_core::{Artifact, BatchOutcome, Finding};

use crate::models::{AnalyzeRequest, BatchRequest};
use crate::{AppError, AppResult, AppState};

/// Evaluate one artifact
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> AppResult<Json<Finding>> {
    request.validate()?;
    let artifact = request.into_artifact();
    let finding = state.engine.evaluate(&artifact)?;
    Ok(Json(finding))
}

/// Evaluate a bounded batch
pub async fn analyze_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> AppResult<Json<BatchOutcome>> {
    request.validate()?;
    if request.items.len() > state.config.max_batch_size {
        return Err(AppError::ValidationError(format!(
            "batch of {} exceeds the configured limit of {}",
            request.items.len(),
            state.config.max_batch_size
        )));
    }

    let artifacts: Vec<Artifact> = request
        .items
        .into_iter()
        .map(AnalyzeRequest::into_artifact)
        .collect();

    // Cancellation between artifacts is the engine's contract; over HTTP
    // the request either completes or the connection drops, so the flag
    // stays unset.
    let cancel = AtomicBool::new(false);
    let outcome = state.engine.evaluate_batch(&artifacts, &cancel)?;
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> AppState {
        AppState::for_tests()
    }

    fn request(body: serde_json::Value) -> AnalyzeRequest {
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_returns_finding() {
        let response = analyze(
            State(state()),
            Json(request(json!({
                "kind": "EMAIL",
                "artifact_id": "m-1",
                "fields": {
                    "subject": "URGENT: verify your account immediately",
                    "body": "Your account is suspended. Click here immediately. Act now."
                }
            }))),
        )
        .await
        .unwrap();

        assert_eq!(response.0.artifact_id, "m-1");
        assert!(response.0.composite_score > 0.0);
    }

    #[tokio::test]
    async fn test_analyze_unknown_kind_is_200_with_rejection() {
        let response = analyze(
            State(state()),
            Json(request(json!({ "kind": "UNSUPPORTED", "fields": {} }))),
        )
        .await
        .unwrap();

        assert_eq!(response.0.composite_score, 0.0);
        assert_eq!(
            response.0.recommendations,
            vec!["artifact kind not supported".to_string()]
        );
    }

    #[tokio::test]
    async fn test_batch_over_limit_rejected() {
        let item = json!({ "kind": "EMAIL", "fields": {} });
        let items: Vec<_> = (0..500).map(|_| item.clone()).collect();
        let request: BatchRequest = serde_json::from_value(json!({ "items": items })).unwrap();

        let err = analyze_batch(State(state()), Json(request)).await.err();
        assert!(matches!(err, Some(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_batch_summary_counts() {
        let request: BatchRequest = serde_json::from_value(json!({
            "items": [
                { "kind": "EMAIL", "fields": { "body": "hello" } },
                { "kind": "UNSUPPORTED", "fields": {} }
            ]
        }))
        .unwrap();

        let outcome = analyze_batch(State(state()), Json(request)).await.unwrap();
        assert_eq!(outcome.0.summary.total, 2);
        assert!(!outcome.0.aborted);
    }
}
