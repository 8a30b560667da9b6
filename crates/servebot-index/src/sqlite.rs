//! Embedded-database backing store.
//!
//! One `documents` table, embeddings stored as little-endian f32 BLOBs.
//! Search still scans every row of the selected collections and ranks in
//! Rust. Durability is what this backend adds, not an ANN structure.
//!
//! Unlike the in-memory store, the database file *is* the authoritative
//! state, so a failed write surfaces as an `Index` error instead of being
//! logged and dropped.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use servebot_core::error::{Result, ServebotError};
use servebot_core::types::{Collection, SearchHit};

use crate::backend::{IndexBackend, NewDoc, check_dimension, check_query_dimension};
use crate::score::{cosine_similarity, rank};

pub struct SqliteIndex {
    conn: Mutex<Connection>,
    dimension: usize,
}

impl SqliteIndex {
    /// Open or create the database at `path`.
    pub fn open(path: &Path, dimension: usize) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|e| ServebotError::Index(format!("DB open: {e}")))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                collection TEXT NOT NULL,
                seq INTEGER NOT NULL,
                content TEXT NOT NULL,
                metadata TEXT NOT NULL DEFAULT '{}',
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_documents_collection
                ON documents(collection, seq);",
        )
        .map_err(|e| ServebotError::Index(format!("Migration: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
            dimension,
        })
    }
}

fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn decode_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

impl IndexBackend for SqliteIndex {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn append(&self, collection: Collection, docs: Vec<NewDoc>) -> Result<Vec<String>> {
        check_dimension(self.dimension, &docs)?;

        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| ServebotError::Index(format!("Begin append: {e}")))?;

        let mut seq: i64 = tx
            .query_row(
                "SELECT COALESCE(MAX(seq) + 1, 0) FROM documents WHERE collection = ?1",
                [collection.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| ServebotError::Index(format!("Next seq: {e}")))?;

        let mut ids = Vec::with_capacity(docs.len());
        for doc in docs {
            let id = format!("{}_{}", collection.as_str(), seq);
            let metadata = serde_json::Value::Object(doc.metadata).to_string();
            tx.execute(
                "INSERT INTO documents (id, collection, seq, content, metadata, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    id,
                    collection.as_str(),
                    seq,
                    doc.content,
                    metadata,
                    encode_embedding(&doc.embedding),
                    chrono::Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| ServebotError::Index(format!("Insert document: {e}")))?;
            ids.push(id);
            seq += 1;
        }

        tx.commit()
            .map_err(|e| ServebotError::Index(format!("Commit append: {e}")))?;
        Ok(ids)
    }

    fn search(
        &self,
        query: &[f32],
        collections: &[Collection],
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        check_query_dimension(self.dimension, query)?;

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT content, metadata, embedding FROM documents
                 WHERE collection = ?1 ORDER BY seq",
            )
            .map_err(|e| ServebotError::Index(format!("Prepare search: {e}")))?;

        let mut hits = Vec::new();
        for collection in Collection::ALL {
            if !collections.contains(&collection) {
                continue;
            }
            let rows = stmt
                .query_map([collection.as_str()], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                    ))
                })
                .map_err(|e| ServebotError::Index(format!("Scan {collection}: {e}")))?;

            for row in rows {
                let (content, metadata_json, blob) =
                    row.map_err(|e| ServebotError::Index(format!("Read row: {e}")))?;
                let metadata = serde_json::from_str::<serde_json::Value>(&metadata_json)
                    .ok()
                    .and_then(|v| v.as_object().cloned())
                    .unwrap_or_default();
                let embedding = decode_embedding(&blob);
                let similarity = cosine_similarity(query, &embedding);
                hits.push(SearchHit {
                    content,
                    metadata,
                    similarity,
                    distance: 1.0 - similarity,
                    collection,
                });
            }
        }

        Ok(rank(hits, limit))
    }

    fn stats(&self) -> BTreeMap<String, usize> {
        let conn = self.conn.lock().unwrap();
        let mut stats: BTreeMap<String, usize> = Collection::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), 0))
            .collect();

        let mut stmt = match conn.prepare("SELECT collection, COUNT(*) FROM documents GROUP BY collection") {
            Ok(s) => s,
            Err(_) => return stats,
        };
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .ok();
        if let Some(rows) = rows {
            for row in rows.flatten() {
                let (name, count) = row;
                stats.insert(name, count as usize);
            }
        }
        stats
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM documents", [])
            .map_err(|e| ServebotError::Index(format!("Clear: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servebot_core::types::Metadata;

    fn scratch(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("servebot-sqlite-index-{name}"));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).ok();
        dir.join("vector_store.db")
    }

    fn doc(content: &str, embedding: Vec<f32>) -> NewDoc {
        NewDoc {
            content: content.to_string(),
            metadata: Metadata::new(),
            embedding,
        }
    }

    #[test]
    fn test_embedding_blob_round_trip() {
        let v = vec![0.25, -1.5, 3.75, 0.0];
        assert_eq!(decode_embedding(&encode_embedding(&v)), v);
    }

    #[test]
    fn test_append_search_stats() {
        let index = SqliteIndex::open(&scratch("basic"), 2).unwrap();
        let ids = index
            .append(
                Collection::Services,
                vec![doc("electrician", vec![1.0, 0.0]), doc("plumber", vec![0.0, 1.0])],
            )
            .unwrap();
        assert_eq!(ids, vec!["services_0", "services_1"]);

        let hits = index
            .search(&[1.0, 0.0], &[Collection::Services], 10)
            .unwrap();
        assert_eq!(hits[0].content, "electrician");
        assert_eq!(hits.len(), 2);

        let stats = index.stats();
        assert_eq!(stats["services"], 2);
        assert_eq!(stats["general"], 0);
    }

    #[test]
    fn test_survives_reopen() {
        let path = scratch("reopen");
        {
            let index = SqliteIndex::open(&path, 2).unwrap();
            index
                .append(Collection::Careers, vec![doc("developer role", vec![0.5, 0.5])])
                .unwrap();
        }
        let reopened = SqliteIndex::open(&path, 2).unwrap();
        assert_eq!(reopened.stats()["careers"], 1);
        let ids = reopened
            .append(Collection::Careers, vec![doc("another role", vec![0.1, 0.9])])
            .unwrap();
        assert_eq!(ids, vec!["careers_1"]);
    }

    #[test]
    fn test_wrong_dimension_rejected() {
        let index = SqliteIndex::open(&scratch("dim"), 4).unwrap();
        assert!(matches!(
            index.append(Collection::General, vec![doc("bad", vec![1.0])]),
            Err(ServebotError::DimensionMismatch { expected: 4, got: 1 })
        ));
    }

    #[test]
    fn test_clear_resets_collections() {
        let index = SqliteIndex::open(&scratch("clear"), 2).unwrap();
        index
            .append(Collection::General, vec![doc("g", vec![1.0, 0.0])])
            .unwrap();
        index.clear().unwrap();
        assert!(index.stats().values().all(|c| *c == 0));
    }
}
