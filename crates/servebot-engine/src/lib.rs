//! # Servebot Engine
//!
//! The request pipeline: a query is classified into an intent, relevant
//! documents are retrieved from the intent's collections, and the generation
//! backend is asked for an answer grounded in that context. Every backend
//! failure degrades; the caller of [`QueryEngine::process`] always receives
//! a well-formed result.
//!
//! Population runs through here too: catalog batches are normalized into
//! typed documents ([`ingest`]), embedded, and inserted into the index.

pub mod engine;
pub mod ingest;
pub mod intent;
pub mod prompts;

pub use engine::QueryEngine;
pub use intent::IntentClassifier;
