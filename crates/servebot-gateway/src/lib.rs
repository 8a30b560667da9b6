//! # Servebot Gateway
//!
//! Thin HTTP surface over the query engine: chat, population, stats,
//! intent probing, and health. Transport only: all pipeline behavior
//! (classification, retrieval, degradation) lives in `servebot-engine`.

pub mod routes;
pub mod server;

pub use server::{AppState, build_engine, build_router, start};
