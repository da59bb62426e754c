//! ThreatLens Analysis Server
//!
//! One HTTP surface over one heuristic scoring engine. Every analyzer
//! domain the fleet used to run as its own service is a rule pack in the
//! engine's catalog; the server only decodes envelopes, calls the engine,
//! and serializes findings.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    THREATLENS SERVER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────────┐  ┌─────────────────────┐  │
//! │  │  API      │  │  Envelope     │  │  Catalog Views      │  │
//! │  │  Router   │  │  Decoding     │  │  (kinds/rules/      │  │
//! │  │  (Axum)   │  │  (JSON→typed) │  │   baselines)        │  │
//! │  └─────┬─────┘  └───────┬───────┘  └──────────┬──────────┘  │
//! │        └────────────────┼─────────────────────┘             │
//! │                         ▼                                   │
//! │                ┌─────────────────┐                          │
//! │                │  Scoring Engine │  (immutable, shared)     │
//! │                └─────────────────┘                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use threatlens_core::catalog::packs;
use threatlens_core::{ArtifactKind, Baseline, Engine, RulePack};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "threatlens_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("ThreatLens server starting...");

    // Build the engine: built-in packs plus optional baseline overrides.
    let engine = build_engine(&config).expect("Failed to build scoring engine");
    tracing::info!(
        "Catalog loaded: {} artifact kinds registered",
        engine.kinds().len()
    );

    let state = AppState {
        engine: Arc::new(engine),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub config: config::Config,
}

impl AppState {
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            engine: Arc::new(Engine::with_default_catalog().unwrap()),
            config: config::Config::from_env(),
        }
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/analyze", post(handlers::analyze::analyze))
        .route(
            "/api/v1/analyze/batch",
            post(handlers::analyze::analyze_batch),
        )
        .route("/api/v1/kinds", get(handlers::catalog::kinds))
        .route("/api/v1/rules/:kind", get(handlers::catalog::rules))
        .route("/api/v1/baselines/:kind", get(handlers::catalog::baselines))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Baseline override file shape: `{ "NETWORK_FLOW": { "bytes.z_score":
/// { "mean": ..., "stddev": ... } } }`.
type BaselineOverrides = BTreeMap<String, BTreeMap<String, Baseline>>;

fn build_engine(config: &config::Config) -> anyhow::Result<Engine> {
    let mut packs = packs::default_packs();

    if let Some(path) = &config.baseline_overrides_path {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading baseline overrides from {}", path))?;
        let overrides: BaselineOverrides =
            serde_json::from_str(&raw).context("parsing baseline overrides")?;
        apply_baseline_overrides(&mut packs, overrides);
        tracing::info!("Baseline overrides applied from {}", path);
    }

    Engine::from_packs(packs).context("building indicator library")
}

fn apply_baseline_overrides(packs: &mut [RulePack], overrides: BaselineOverrides) {
    for (kind_tag, baselines) in overrides {
        let kind = ArtifactKind::from(kind_tag.as_str());
        let Some(pack) = packs.iter_mut().find(|p| p.profile.kind == kind) else {
            tracing::warn!("baseline override for unregistered kind {}", kind_tag);
            continue;
        };
        for (name, baseline) in baselines {
            if let Some(entry) = pack.baselines.iter_mut().find(|(n, _)| *n == name) {
                entry.1 = baseline;
            } else {
                pack.baselines.push((name, baseline));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_baseline_overrides_replaces_and_adds() {
        let mut packs = packs::default_packs();
        let mut per_kind = BTreeMap::new();
        per_kind.insert("bytes.z_score".to_string(), Baseline::new(9_000.0, 2_000.0));
        per_kind.insert("new.metric".to_string(), Baseline::new(1.0, 1.0));
        let mut overrides = BaselineOverrides::new();
        overrides.insert("NETWORK_FLOW".to_string(), per_kind);

        apply_baseline_overrides(&mut packs, overrides);

        let flow = packs
            .iter()
            .find(|p| p.profile.kind == ArtifactKind::NetworkFlow)
            .unwrap();
        let bytes = flow
            .baselines
            .iter()
            .find(|(n, _)| n == "bytes.z_score")
            .unwrap();
        assert_eq!(bytes.1.mean, 9_000.0);
        assert!(flow.baselines.iter().any(|(n, _)| n == "new.metric"));
    }

    #[test]
    fn test_router_builds() {
        let state = AppState::for_tests();
        let _ = create_router(state);
    }
}
