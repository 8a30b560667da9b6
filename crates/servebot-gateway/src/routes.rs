//! API route handlers for the gateway.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use servebot_core::types::CatalogBatch;
use servebot_engine::QueryEngine;

use super::server::AppState;

/// Chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

type ApiResult = std::result::Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)>;

/// 503 body for requests arriving before the engine exists.
fn engine_unavailable() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({
            "error": "Query engine not available. Please try again later."
        })),
    )
}

fn require_engine(state: &AppState) -> std::result::Result<&Arc<QueryEngine>, (StatusCode, Json<serde_json::Value>)> {
    state.engine.as_ref().ok_or_else(engine_unavailable)
}

/// Health check endpoint (also served at `/`).
pub async fn root(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    health_check(State(state)).await
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let uptime = state.start_time.elapsed();
    match &state.engine {
        Some(engine) => {
            let stats = engine.stats();
            let total: usize = stats.values().sum();
            Json(serde_json::json!({
                "status": "healthy",
                "service": "servebot-gateway",
                "version": env!("CARGO_PKG_VERSION"),
                "uptime_secs": uptime.as_secs(),
                "message": format!("Query engine operational with {total} documents"),
                "vector_store_stats": stats,
            }))
        }
        None => Json(serde_json::json!({
            "status": "unhealthy",
            "service": "servebot-gateway",
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_secs": uptime.as_secs(),
            "message": "Query engine not initialized",
        })),
    }
}

/// Main chat endpoint.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatMessage>,
) -> ApiResult {
    let engine = require_engine(&state)?;

    let outcome = engine.process(&body.message).await.map_err(|e| {
        tracing::error!("❌ Error processing chat message: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "Error processing your message. Please try again."
            })),
        )
    })?;

    let suggested_actions = engine.suggested_actions(outcome.intent);

    Ok(Json(serde_json::json!({
        "response": outcome.response,
        "intent": outcome.intent,
        "sources": outcome.sources,
        "num_sources": outcome.num_sources,
        "suggested_actions": suggested_actions,
        "session_id": body.session_id,
    })))
}

/// Ingest a catalog batch produced by content acquisition.
pub async fn populate(
    State(state): State<Arc<AppState>>,
    Json(batch): Json<CatalogBatch>,
) -> ApiResult {
    let engine = require_engine(&state)?;

    let stats = engine.populate(&batch).await.map_err(|e| {
        tracing::error!("❌ Error populating vector store: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": format!("Error updating vector store: {e}") })),
        )
    })?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Vector store updated successfully",
        "stats": stats,
    })))
}

/// Wipe all collections and persist the empty state.
pub async fn clear(State(state): State<Arc<AppState>>) -> ApiResult {
    let engine = require_engine(&state)?;

    engine.clear().map_err(|e| {
        tracing::error!("❌ Error clearing vector store: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": format!("Error clearing vector store: {e}") })),
        )
    })?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "All collections cleared",
        "stats": engine.stats(),
    })))
}

/// Vector store statistics.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult {
    let engine = require_engine(&state)?;
    let stats = engine.stats();
    let total: usize = stats.values().sum();
    Ok(Json(serde_json::json!({
        "collections": stats,
        "total_documents": total,
    })))
}

/// Classification probe for a query.
pub async fn test_intent(
    State(state): State<Arc<AppState>>,
    Path(query): Path<String>,
) -> ApiResult {
    let engine = require_engine(&state)?;
    let intent = engine.classify(&query);
    Ok(Json(serde_json::json!({
        "query": query,
        "classified_intent": intent,
        "suggested_actions": engine.suggested_actions(intent),
    })))
}
