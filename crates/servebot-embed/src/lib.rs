//! # Servebot Embed
//!
//! The embedding gateway: turns text into fixed-dimension vectors by calling
//! an OpenAI-compatible embeddings endpoint.
//!
//! Failure policy: the gateway never propagates a backend failure. Any error
//! (connect, non-success status, timeout, malformed response) yields an
//! all-zero vector of the configured dimension per input text, observable
//! only via a warn log. Embeddings are recomputed on every call; a cache
//! would be a reasonable future optimization, not part of the contract.

pub mod openai;

pub use openai::OpenAiEmbedder;
