//! HTTP server implementation using Axum.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use servebot_core::config::{GatewayConfig, ServebotConfig};
use servebot_core::traits::provider::GenerateParams;
use servebot_engine::QueryEngine;
use servebot_index::SimilarityIndex;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub gateway_config: GatewayConfig,
    pub start_time: std::time::Instant,
    /// The query engine. `None` when initialization failed at startup;
    /// requests then get a 503 instead of a crash.
    pub engine: Option<Arc<QueryEngine>>,
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let shared = Arc::new(state);

    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);
    let origins: Vec<_> = shared
        .gateway_config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
        .collect();
    let cors = if origins.is_empty() {
        // Development fallback — allow all origins
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    };

    Router::new()
        .route("/", get(super::routes::root))
        .route("/health", get(super::routes::health_check))
        .route("/chat", post(super::routes::chat))
        .route("/populate", post(super::routes::populate))
        .route("/clear", post(super::routes::clear))
        .route("/stats", get(super::routes::get_stats))
        .route("/intent/{query}", get(super::routes::test_intent))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Build the query engine from configuration: embedding gateway, backing
/// store, similarity index, generation provider.
pub fn build_engine(config: &ServebotConfig) -> servebot_core::error::Result<QueryEngine> {
    let embedder = Arc::new(servebot_embed::OpenAiEmbedder::from_config(config));
    let backend = servebot_index::create_backend(config)?;
    let index = SimilarityIndex::new(embedder, backend)?;
    let provider = servebot_providers::create_provider(config)?;
    let params = GenerateParams {
        model: config.llm.model.clone(),
        temperature: config.llm.temperature,
        max_tokens: config.llm.max_tokens,
    };
    Ok(QueryEngine::new(Arc::new(index), provider, params))
}

/// Seed an empty index from the configured catalog batch file, if any.
async fn seed_if_empty(engine: &QueryEngine, config: &ServebotConfig) {
    if config.catalog.seed_path.is_empty() || engine.index().total_documents() > 0 {
        return;
    }

    let path = std::path::Path::new(&config.catalog.seed_path);
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("⚠️ Could not read seed catalog {}: {e}", path.display());
            return;
        }
    };
    let batch = match serde_json::from_str(&content) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!("⚠️ Could not parse seed catalog {}: {e}", path.display());
            return;
        }
    };

    match engine.populate(&batch).await {
        Ok(stats) => {
            let total: usize = stats.values().sum();
            tracing::info!("🌱 Seeded empty index with {total} document(s) from {}", path.display());
        }
        Err(e) => tracing::warn!("⚠️ Seeding from {} failed: {e}", path.display()),
    }
}

/// Start the HTTP server.
pub async fn start(config: &ServebotConfig) -> anyhow::Result<()> {
    let engine = match build_engine(config) {
        Ok(engine) => {
            let stats = engine.stats();
            let total: usize = stats.values().sum();
            tracing::info!(
                "✅ Query engine initialized (index={}, provider={}, {} document(s))",
                engine.index().backend_name(),
                config.llm.provider,
                total
            );
            Some(Arc::new(engine))
        }
        Err(e) => {
            tracing::warn!("⚠️ Query engine not available: {e} — serving health endpoints only");
            None
        }
    };

    if let Some(engine) = &engine {
        seed_if_empty(engine, config).await;
    }

    let state = AppState {
        gateway_config: config.gateway.clone(),
        start_time: std::time::Instant::now(),
        engine,
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Gateway server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
