//! # Servebot Index
//!
//! In-process similarity index over three named collections (`general`,
//! `services`, `careers`). Documents carry content, metadata, and a
//! fixed-dimension embedding; search ranks by cosine similarity against a
//! query embedding produced by the embedding gateway.
//!
//! Search is a brute-force scan: O(total documents × embedding dimension)
//! per query. That is a deliberate scale boundary: fine for a catalog of
//! hundreds to a few thousand documents. A corpus beyond that needs a real
//! ANN structure behind the same [`backend::IndexBackend`] seam.
//!
//! Two backing stores, selected at construction time:
//! - [`MemoryIndex`]: parallel arrays per collection, persisted as a whole
//!   JSON snapshot.
//! - [`SqliteIndex`]: an embedded SQLite database, one row per document.

pub mod backend;
pub mod memory;
pub mod score;
pub mod sqlite;
pub mod store;

pub use backend::{IndexBackend, NewDoc, create_backend};
pub use memory::MemoryIndex;
pub use score::cosine_similarity;
pub use sqlite::SqliteIndex;
pub use store::SimilarityIndex;
