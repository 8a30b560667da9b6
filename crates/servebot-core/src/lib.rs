//! # Servebot Core
//!
//! Shared foundation for the Servebot workspace: configuration, the error
//! taxonomy, data types (documents, collections, intents, query results),
//! and the trait seams the engine is wired through (`Provider` for text
//! generation, `Embedder` for text embeddings).

pub mod config;
pub mod error;
pub mod traits;
pub mod types;
