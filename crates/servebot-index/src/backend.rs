//! The backing-store seam of the similarity index.
//!
//! Both implementations scan every document in the selected collections and
//! rank by cosine similarity; they differ only in where the documents live
//! and how they survive a restart.

use std::collections::BTreeMap;

use servebot_core::config::ServebotConfig;
use servebot_core::error::{Result, ServebotError};
use servebot_core::types::{Collection, Metadata, SearchHit};

use crate::memory::MemoryIndex;
use crate::sqlite::SqliteIndex;

/// A document ready for insertion: content, metadata, and an embedding of
/// the index's dimension. The id is assigned by the backend on append.
#[derive(Debug, Clone)]
pub struct NewDoc {
    pub content: String,
    pub metadata: Metadata,
    pub embedding: Vec<f32>,
}

/// A backing store holding the partitioned document collections.
pub trait IndexBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Embedding dimension, fixed for the life of the store.
    fn dimension(&self) -> usize;

    /// Append documents to one collection, assigning each an id unique
    /// within it. Rejects embeddings whose length is not `dimension()`.
    /// Returns the assigned ids in input order.
    fn append(&self, collection: Collection, docs: Vec<NewDoc>) -> Result<Vec<String>>;

    /// Scan the given collections and return hits ranked by descending
    /// cosine similarity, truncated to `limit`.
    fn search(
        &self,
        query: &[f32],
        collections: &[Collection],
        limit: usize,
    ) -> Result<Vec<SearchHit>>;

    /// Document count per collection.
    fn stats(&self) -> BTreeMap<String, usize>;

    /// Empty all collections and persist the empty state.
    fn clear(&self) -> Result<()>;
}

/// Construct the backing store selected by `[index] backend`.
pub fn create_backend(config: &ServebotConfig) -> Result<Box<dyn IndexBackend>> {
    let data_dir = config.data_dir();
    let dimension = config.embedding.dimension;

    match config.index.backend.as_str() {
        "memory" => Ok(Box::new(MemoryIndex::open(
            data_dir.join("vector_store.json"),
            dimension,
        ))),
        "sqlite" => Ok(Box::new(SqliteIndex::open(
            &data_dir.join("vector_store.db"),
            dimension,
        )?)),
        other => Err(ServebotError::Config(format!(
            "Unknown index backend '{other}' (expected \"memory\" or \"sqlite\")"
        ))),
    }
}

pub(crate) fn check_dimension(expected: usize, docs: &[NewDoc]) -> Result<()> {
    for doc in docs {
        if doc.embedding.len() != expected {
            return Err(ServebotError::DimensionMismatch {
                expected,
                got: doc.embedding.len(),
            });
        }
    }
    Ok(())
}

pub(crate) fn check_query_dimension(expected: usize, query: &[f32]) -> Result<()> {
    if query.len() != expected {
        return Err(ServebotError::DimensionMismatch {
            expected,
            got: query.len(),
        });
    }
    Ok(())
}
