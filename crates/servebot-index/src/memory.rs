//! In-memory backing store with whole-index JSON snapshot persistence.
//!
//! Each collection is a set of parallel arrays (ids, contents, metadatas,
//! embeddings) plus a monotonic id counter. One `RwLock` guards the whole
//! set: searches share a read lock, insert/clear take the write lock, and no
//! backend I/O ever happens under either; the query is embedded before the
//! store is touched.
//!
//! The snapshot is written to a temp file and renamed into place, so a
//! successful write fully replaces the prior file. A missing, unreadable, or
//! dimension-incompatible snapshot is not fatal: the index starts empty with
//! a warning, and in-memory state stays authoritative for the life of the
//! process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use servebot_core::error::Result;
use servebot_core::types::{Collection, Metadata, SearchHit};

use crate::backend::{IndexBackend, NewDoc, check_dimension, check_query_dimension};
use crate::score::{cosine_similarity, rank};

const SNAPSHOT_VERSION: u32 = 1;

/// One collection's storage: parallel arrays plus the id counter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Shard {
    ids: Vec<String>,
    contents: Vec<String>,
    metadatas: Vec<Metadata>,
    embeddings: Vec<Vec<f32>>,
    #[serde(default)]
    next_id: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ShardSet {
    general: Shard,
    services: Shard,
    careers: Shard,
}

impl ShardSet {
    fn get(&self, collection: Collection) -> &Shard {
        match collection {
            Collection::General => &self.general,
            Collection::Services => &self.services,
            Collection::Careers => &self.careers,
        }
    }

    fn get_mut(&mut self, collection: Collection) -> &mut Shard {
        match collection {
            Collection::General => &mut self.general,
            Collection::Services => &mut self.services,
            Collection::Careers => &mut self.careers,
        }
    }
}

/// On-disk snapshot envelope.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    dimension: usize,
    saved_at: chrono::DateTime<chrono::Utc>,
    collections: ShardSet,
}

pub struct MemoryIndex {
    dimension: usize,
    snapshot_path: PathBuf,
    shards: RwLock<ShardSet>,
}

impl MemoryIndex {
    /// Open the store, restoring the snapshot at `snapshot_path` if one
    /// exists and is readable.
    pub fn open(snapshot_path: PathBuf, dimension: usize) -> Self {
        let shards = Self::load_snapshot(&snapshot_path, dimension);
        Self {
            dimension,
            snapshot_path,
            shards: RwLock::new(shards),
        }
    }

    fn load_snapshot(path: &Path, dimension: usize) -> ShardSet {
        if !path.exists() {
            tracing::info!("No existing index snapshot at {}, starting fresh", path.display());
            return ShardSet::default();
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("⚠️ Could not read index snapshot {}: {e} — starting empty", path.display());
                return ShardSet::default();
            }
        };

        let snapshot: Snapshot = match serde_json::from_str(&content) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("⚠️ Corrupt index snapshot {}: {e} — starting empty", path.display());
                return ShardSet::default();
            }
        };

        if snapshot.dimension != dimension {
            tracing::warn!(
                "⚠️ Index snapshot dimension {} does not match configured {} — starting empty",
                snapshot.dimension,
                dimension
            );
            return ShardSet::default();
        }

        let total: usize = Collection::ALL
            .iter()
            .map(|c| snapshot.collections.get(*c).ids.len())
            .sum();
        tracing::info!("📦 Index snapshot restored: {} document(s) from {}", total, path.display());
        snapshot.collections
    }

    /// Write the full snapshot. Errors are the caller's to log; a failed
    /// persist never invalidates in-memory state.
    fn persist(&self, shards: &ShardSet) -> Result<()> {
        if let Some(parent) = self.snapshot_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            dimension: self.dimension,
            saved_at: chrono::Utc::now(),
            collections: shards.clone(),
        };
        let json = serde_json::to_string(&snapshot)?;
        let tmp = self.snapshot_path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.snapshot_path)?;
        Ok(())
    }

    fn persist_current(&self) {
        let shards = self.shards.read().unwrap();
        if let Err(e) = self.persist(&shards) {
            tracing::warn!("⚠️ Could not save index snapshot: {e}");
        }
    }
}

impl IndexBackend for MemoryIndex {
    fn name(&self) -> &str {
        "memory"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn append(&self, collection: Collection, docs: Vec<NewDoc>) -> Result<Vec<String>> {
        check_dimension(self.dimension, &docs)?;

        let mut ids = Vec::with_capacity(docs.len());
        {
            let mut shards = self.shards.write().unwrap();
            let shard = shards.get_mut(collection);
            for doc in docs {
                let id = format!("{}_{}", collection.as_str(), shard.next_id);
                shard.next_id += 1;
                shard.ids.push(id.clone());
                shard.contents.push(doc.content);
                shard.metadatas.push(doc.metadata);
                shard.embeddings.push(doc.embedding);
                ids.push(id);
            }
        }

        self.persist_current();
        Ok(ids)
    }

    fn search(
        &self,
        query: &[f32],
        collections: &[Collection],
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        check_query_dimension(self.dimension, query)?;

        let shards = self.shards.read().unwrap();
        let mut hits = Vec::new();
        for collection in Collection::ALL {
            if !collections.contains(&collection) {
                continue;
            }
            let shard = shards.get(collection);
            for i in 0..shard.embeddings.len() {
                let similarity = cosine_similarity(query, &shard.embeddings[i]);
                hits.push(SearchHit {
                    content: shard.contents[i].clone(),
                    metadata: shard.metadatas[i].clone(),
                    similarity,
                    distance: 1.0 - similarity,
                    collection,
                });
            }
        }
        drop(shards);

        Ok(rank(hits, limit))
    }

    fn stats(&self) -> BTreeMap<String, usize> {
        let shards = self.shards.read().unwrap();
        Collection::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), shards.get(*c).ids.len()))
            .collect()
    }

    fn clear(&self) -> Result<()> {
        {
            let mut shards = self.shards.write().unwrap();
            *shards = ShardSet::default();
        }
        self.persist_current();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servebot_core::error::ServebotError;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("servebot-memory-index-{name}"));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).ok();
        dir.join("vector_store.json")
    }

    fn doc(content: &str, embedding: Vec<f32>) -> NewDoc {
        NewDoc {
            content: content.to_string(),
            metadata: Metadata::new(),
            embedding,
        }
    }

    #[test]
    fn test_append_assigns_collection_scoped_ids() {
        let index = MemoryIndex::open(scratch("ids"), 2);
        let ids = index
            .append(
                Collection::Services,
                vec![doc("a", vec![1.0, 0.0]), doc("b", vec![0.0, 1.0])],
            )
            .unwrap();
        assert_eq!(ids, vec!["services_0", "services_1"]);

        let ids = index
            .append(Collection::Careers, vec![doc("c", vec![1.0, 1.0])])
            .unwrap();
        assert_eq!(ids, vec!["careers_0"]);
    }

    #[test]
    fn test_wrong_dimension_rejected_without_mutation() {
        let index = MemoryIndex::open(scratch("dim"), 3);
        let err = index
            .append(Collection::General, vec![doc("bad", vec![1.0, 2.0])])
            .unwrap_err();
        assert!(matches!(
            err,
            ServebotError::DimensionMismatch { expected: 3, got: 2 }
        ));
        assert_eq!(index.stats()["general"], 0);
    }

    #[test]
    fn test_search_orders_by_similarity_and_respects_limit() {
        let index = MemoryIndex::open(scratch("order"), 2);
        index
            .append(
                Collection::General,
                vec![
                    doc("orthogonal", vec![0.0, 1.0]),
                    doc("exact", vec![1.0, 0.0]),
                    doc("diagonal", vec![1.0, 1.0]),
                ],
            )
            .unwrap();

        let hits = index.search(&[1.0, 0.0], &Collection::ALL, 10).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].content, "exact");
        assert_eq!(hits[1].content, "diagonal");
        assert_eq!(hits[2].content, "orthogonal");
        for pair in hits.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }

        let top = index.search(&[1.0, 0.0], &Collection::ALL, 2).unwrap();
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn test_tie_breaks_follow_collection_then_insertion_order() {
        let index = MemoryIndex::open(scratch("ties"), 2);
        index
            .append(Collection::Careers, vec![doc("career doc", vec![1.0, 0.0])])
            .unwrap();
        index
            .append(
                Collection::General,
                vec![
                    doc("general first", vec![1.0, 0.0]),
                    doc("general second", vec![1.0, 0.0]),
                ],
            )
            .unwrap();

        let hits = index.search(&[1.0, 0.0], &Collection::ALL, 10).unwrap();
        assert_eq!(hits[0].content, "general first");
        assert_eq!(hits[1].content, "general second");
        assert_eq!(hits[2].content, "career doc");
    }

    #[test]
    fn test_zero_query_vector_scores_zero_everywhere() {
        let index = MemoryIndex::open(scratch("zero"), 2);
        index
            .append(Collection::Services, vec![doc("s", vec![3.0, 4.0])])
            .unwrap();
        let hits = index.search(&[0.0, 0.0], &Collection::ALL, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].similarity, 0.0);
        assert_eq!(hits[0].distance, 1.0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let path = scratch("roundtrip");
        {
            let index = MemoryIndex::open(path.clone(), 2);
            index
                .append(Collection::Services, vec![doc("svc", vec![1.0, 0.0])])
                .unwrap();
            index
                .append(Collection::Careers, vec![doc("job", vec![0.0, 1.0])])
                .unwrap();
        }

        let reopened = MemoryIndex::open(path, 2);
        let stats = reopened.stats();
        assert_eq!(stats["services"], 1);
        assert_eq!(stats["careers"], 1);
        assert_eq!(stats["general"], 0);

        let hits = reopened.search(&[1.0, 0.0], &Collection::ALL, 1).unwrap();
        assert_eq!(hits[0].content, "svc");

        // Ids keep growing from the restored counter.
        let ids = reopened
            .append(Collection::Services, vec![doc("svc2", vec![1.0, 1.0])])
            .unwrap();
        assert_eq!(ids, vec!["services_1"]);
    }

    #[test]
    fn test_corrupt_snapshot_starts_empty() {
        let path = scratch("corrupt");
        std::fs::write(&path, "{ not json").unwrap();
        let index = MemoryIndex::open(path, 2);
        assert!(index.stats().values().all(|c| *c == 0));
    }

    #[test]
    fn test_dimension_drift_starts_empty() {
        let path = scratch("drift");
        {
            let index = MemoryIndex::open(path.clone(), 2);
            index
                .append(Collection::General, vec![doc("g", vec![1.0, 0.0])])
                .unwrap();
        }
        let reopened = MemoryIndex::open(path, 4);
        assert!(reopened.stats().values().all(|c| *c == 0));
    }

    #[test]
    fn test_clear_empties_and_persists() {
        let path = scratch("clear");
        let index = MemoryIndex::open(path.clone(), 2);
        index
            .append(Collection::General, vec![doc("g", vec![1.0, 0.0])])
            .unwrap();
        index.clear().unwrap();
        assert!(index.stats().values().all(|c| *c == 0));

        let reopened = MemoryIndex::open(path, 2);
        assert!(reopened.stats().values().all(|c| *c == 0));
    }
}
