//! The similarity index: an explicitly constructed object owning all
//! document storage, handed to the engine and gateway by `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;

use servebot_core::error::{Result, ServebotError};
use servebot_core::traits::Embedder;
use servebot_core::types::{Collection, Intent, SearchHit};

use crate::backend::{IndexBackend, NewDoc};

pub struct SimilarityIndex {
    embedder: Arc<dyn Embedder>,
    backend: Box<dyn IndexBackend>,
}

impl SimilarityIndex {
    pub fn new(embedder: Arc<dyn Embedder>, backend: Box<dyn IndexBackend>) -> Result<Self> {
        if embedder.dimension() != backend.dimension() {
            return Err(ServebotError::DimensionMismatch {
                expected: backend.dimension(),
                got: embedder.dimension(),
            });
        }
        Ok(Self { embedder, backend })
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    pub fn dimension(&self) -> usize {
        self.backend.dimension()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Insert documents, routing each to its collection by the `type`
    /// metadata tag (`service` → services, `career` → careers, anything
    /// else → general). A document lands in exactly one collection.
    ///
    /// The whole batch is rejected before any mutation if an embedding has
    /// the wrong length.
    pub fn insert(&self, docs: Vec<NewDoc>) -> Result<usize> {
        for doc in &docs {
            if doc.embedding.len() != self.dimension() {
                return Err(ServebotError::DimensionMismatch {
                    expected: self.dimension(),
                    got: doc.embedding.len(),
                });
            }
        }

        let total = docs.len();
        let mut groups: Vec<(Collection, Vec<NewDoc>)> =
            Collection::ALL.iter().map(|c| (*c, Vec::new())).collect();
        for doc in docs {
            let doc_type = doc
                .metadata
                .get("type")
                .and_then(|v| v.as_str())
                .unwrap_or("general");
            let target = Collection::for_doc_type(doc_type);
            if let Some((_, group)) = groups.iter_mut().find(|(c, _)| *c == target) {
                group.push(doc);
            }
        }

        for (collection, group) in groups {
            if group.is_empty() {
                continue;
            }
            let count = group.len();
            self.backend.append(collection, group)?;
            tracing::debug!("Added {count} document(s) to the {collection} collection");
        }

        Ok(total)
    }

    /// Embed the query and rank every document in the selected collections
    /// (default: all) by cosine similarity. The embedding call happens
    /// before the backing store is touched, so a slow embedding backend
    /// never blocks concurrent readers.
    pub async fn search(
        &self,
        query: &str,
        collections: Option<&[Collection]>,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let vector = self.embedder.embed_one(query).await;
        let scope = collections.unwrap_or(&Collection::ALL);
        self.backend.search(&vector, scope, limit)
    }

    /// Search the collections an intent routes to. General queries also
    /// scan the services collection; the asymmetry is deliberate.
    pub async fn search_by_intent(
        &self,
        query: &str,
        intent: Intent,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let scope: &[Collection] = match intent {
            Intent::Careers => &[Collection::Careers],
            Intent::Services => &[Collection::Services],
            Intent::General => &[Collection::General, Collection::Services],
        };
        self.search(query, Some(scope), limit).await
    }

    /// Document count per collection.
    pub fn stats(&self) -> BTreeMap<String, usize> {
        self.backend.stats()
    }

    pub fn total_documents(&self) -> usize {
        self.stats().values().sum()
    }

    /// Empty all collections and persist the empty state. Population is
    /// append-only; this full reset is the only way to remove documents.
    pub fn clear(&self) -> Result<()> {
        self.backend.clear()
    }
}
