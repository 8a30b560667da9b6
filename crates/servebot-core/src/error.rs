//! Error taxonomy for Servebot.
//!
//! Two families matter at the call sites: backend failures that the pipeline
//! absorbs (embedding/generation calls degrade to zero vectors or fallback
//! text and are only ever logged), and explicit rejections that callers must
//! see (`DimensionMismatch`, `UnknownCollection`, `Unavailable`). Functions on
//! the degrade path return plain values, not this error.

use thiserror::Error;

/// All errors produced by the Servebot crates.
#[derive(Debug, Error)]
pub enum ServebotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("API key missing for provider '{0}'")]
    ApiKeyMissing(String),

    #[error("Unknown provider: {0}")]
    ProviderNotFound(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ServebotError>;
