//! The query pipeline: classify → retrieve → generate → degrade.

use std::collections::BTreeMap;
use std::sync::Arc;

use servebot_core::error::Result;
use servebot_core::traits::provider::{GenerateParams, Provider};
use servebot_core::types::{CatalogBatch, Intent, Message, QueryOutcome, SourceRef};
use servebot_index::{NewDoc, SimilarityIndex};

use crate::ingest;
use crate::intent::IntentClassifier;
use crate::prompts;

/// Documents retrieved per query.
const RETRIEVAL_LIMIT: usize = 3;
/// Source preview length, in characters.
const SOURCE_PREVIEW_CHARS: usize = 200;

/// Truncate content for a source citation, appending an ellipsis when cut.
/// Operates on characters, not bytes, so multi-byte content never splits.
fn preview(content: &str, max_chars: usize) -> String {
    let mut chars = content.char_indices();
    match chars.nth(max_chars) {
        None => content.to_string(),
        Some((byte_end, _)) => format!("{}...", &content[..byte_end]),
    }
}

/// Orchestrates one query through the full pipeline, and catalog batches
/// through population. Holds shared references only; every method takes
/// `&self`, so one engine serves concurrent requests.
pub struct QueryEngine {
    classifier: IntentClassifier,
    index: Arc<SimilarityIndex>,
    provider: Box<dyn Provider>,
    params: GenerateParams,
}

impl QueryEngine {
    pub fn new(
        index: Arc<SimilarityIndex>,
        provider: Box<dyn Provider>,
        params: GenerateParams,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            index,
            provider,
            params,
        }
    }

    pub fn index(&self) -> &Arc<SimilarityIndex> {
        &self.index
    }

    pub fn classify(&self, query: &str) -> Intent {
        self.classifier.classify(query)
    }

    pub fn suggested_actions(&self, intent: Intent) -> Vec<String> {
        prompts::suggested_actions(intent)
    }

    /// Run a query through the pipeline.
    ///
    /// Generation and embedding failures never surface here: a failed
    /// embedding ranks with a zero vector, a failed generation returns the
    /// intent's canned fallback. The only errors are index-level ones
    /// (backing-store failure, malformed input).
    pub async fn process(&self, query: &str) -> Result<QueryOutcome> {
        let intent = self.classifier.classify(query);

        let hits = self
            .index
            .search_by_intent(query, intent, RETRIEVAL_LIMIT)
            .await?;

        let context: String = hits.iter().map(|h| format!("- {}\n", h.content)).collect();

        let messages = [
            Message::system(prompts::system_prompt(intent)),
            Message::user(&format!("Context: {context}\n\nQuestion: {query}")),
        ];

        let response = match self.provider.chat(&messages, &self.params).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!("⚠️ Generation backend failed, serving {intent} fallback: {e}");
                prompts::fallback_response(intent).to_string()
            }
        };

        let sources: Vec<SourceRef> = hits
            .iter()
            .map(|h| SourceRef {
                content: preview(&h.content, SOURCE_PREVIEW_CHARS),
                metadata: h.metadata.clone(),
                relevance_score: 1.0 - h.distance,
            })
            .collect();

        Ok(QueryOutcome {
            query: query.to_string(),
            intent,
            response,
            num_sources: hits.len(),
            sources,
        })
    }

    /// Normalize, embed, and index a catalog batch. Returns the resulting
    /// per-collection counts.
    pub async fn populate(&self, batch: &CatalogBatch) -> Result<BTreeMap<String, usize>> {
        let raw = ingest::prepare_documents(batch);
        if raw.is_empty() {
            return Ok(self.index.stats());
        }

        let texts: Vec<String> = raw.iter().map(|d| d.content.clone()).collect();
        let embeddings = self.index.embedder().embed(&texts).await;

        let docs: Vec<NewDoc> = raw
            .into_iter()
            .zip(embeddings)
            .map(|(d, embedding)| NewDoc {
                content: d.content,
                metadata: d.metadata,
                embedding,
            })
            .collect();

        let count = self.index.insert(docs)?;
        tracing::info!("📚 Indexed {count} document(s) from catalog batch");
        Ok(self.index.stats())
    }

    pub fn stats(&self) -> BTreeMap<String, usize> {
        self.index.stats()
    }

    pub fn clear(&self) -> Result<()> {
        self.index.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use servebot_core::error::ServebotError;
    use servebot_core::traits::Embedder;
    use servebot_core::types::{Collection, Metadata};
    use servebot_index::MemoryIndex;
    use std::hash::{Hash, Hasher};

    const DIM: usize = 16;

    struct TokenEmbedder;

    fn token_vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; DIM];
        for token in text.to_lowercase().split_whitespace() {
            let mut h = std::collections::hash_map::DefaultHasher::new();
            token.hash(&mut h);
            v[(h.finish() % DIM as u64) as usize] += 1.0;
        }
        v
    }

    #[async_trait]
    impl Embedder for TokenEmbedder {
        fn name(&self) -> &str {
            "token"
        }

        fn dimension(&self) -> usize {
            DIM
        }

        async fn embed(&self, texts: &[String]) -> Vec<Vec<f32>> {
            texts.iter().map(|t| token_vector(t)).collect()
        }
    }

    /// Always answers with a fixed completion.
    struct CannedProvider(&'static str);

    #[async_trait]
    impl Provider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn chat(&self, _messages: &[Message], _params: &GenerateParams) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    /// Simulates an unavailable generation backend.
    struct DownProvider;

    #[async_trait]
    impl Provider for DownProvider {
        fn name(&self) -> &str {
            "down"
        }

        async fn chat(&self, _messages: &[Message], _params: &GenerateParams) -> Result<String> {
            Err(ServebotError::Http("connection refused".into()))
        }
    }

    fn params() -> GenerateParams {
        GenerateParams {
            model: "test-model".into(),
            temperature: 0.7,
            max_tokens: 256,
        }
    }

    fn test_engine(name: &str, provider: Box<dyn Provider>) -> QueryEngine {
        let dir = std::env::temp_dir().join(format!("servebot-engine-{name}"));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).ok();
        let backend = MemoryIndex::open(dir.join("vector_store.json"), DIM);
        let index = SimilarityIndex::new(Arc::new(TokenEmbedder), Box::new(backend)).unwrap();
        QueryEngine::new(Arc::new(index), provider, params())
    }

    fn typed_doc(content: &str, doc_type: &str) -> NewDoc {
        let mut metadata = Metadata::new();
        metadata.insert("type".into(), doc_type.into());
        NewDoc {
            content: content.to_string(),
            metadata,
            embedding: token_vector(content),
        }
    }

    fn seed_catalog(engine: &QueryEngine) {
        engine
            .index()
            .insert(vec![
                typed_doc(
                    "Electrician: starting ₹299. Wiring, fan installation, and repairs \
                     by licensed professionals.",
                    "service",
                ),
                typed_doc(
                    "Senior Full Stack Developer, Mumbai. 5+ years experience with React \
                     and Node.js. Engineering department.",
                    "career",
                ),
            ])
            .unwrap();
    }

    #[tokio::test]
    async fn test_service_query_end_to_end() {
        let engine = test_engine("e2e-service", Box::new(DownProvider));
        seed_catalog(&engine);

        let outcome = engine.process("How much does an electrician cost?").await.unwrap();
        assert_eq!(outcome.intent, Intent::Services);
        assert!(!outcome.response.is_empty());
        assert!(outcome.num_sources >= 1);
        assert!(outcome.sources[0].content.contains("Electrician"));
        assert!(
            engine
                .suggested_actions(outcome.intent)
                .contains(&"Book a service".to_string())
        );
    }

    #[tokio::test]
    async fn test_career_query_end_to_end() {
        let engine = test_engine("e2e-career", Box::new(DownProvider));
        seed_catalog(&engine);

        let outcome = engine.process("Do you have any developer jobs?").await.unwrap();
        assert_eq!(outcome.intent, Intent::Careers);
        assert!(outcome.sources[0].content.contains("Full Stack Developer"));
        assert!(
            engine
                .suggested_actions(outcome.intent)
                .contains(&"Browse all job openings".to_string())
        );
    }

    #[tokio::test]
    async fn test_generation_failure_degrades_to_intent_fallback() {
        let engine = test_engine("fallback", Box::new(DownProvider));
        seed_catalog(&engine);

        let outcome = engine.process("Book an electrician").await.unwrap();
        assert_eq!(outcome.intent, Intent::Services);
        assert_eq!(outcome.response, prompts::fallback_response(Intent::Services));
        assert!(outcome.response.contains("₹299"));
    }

    #[tokio::test]
    async fn test_successful_generation_is_trimmed_verbatim() {
        let engine = test_engine("trim", Box::new(CannedProvider("  An answer.  \n")));
        seed_catalog(&engine);

        let outcome = engine.process("What services do you offer?").await.unwrap();
        assert_eq!(outcome.response, "An answer.");
    }

    #[tokio::test]
    async fn test_sources_are_truncated_with_ellipsis() {
        let engine = test_engine("truncate", Box::new(DownProvider));
        let long_content = format!("Electrician service details. {}", "x".repeat(300));
        engine
            .index()
            .insert(vec![typed_doc(&long_content, "service")])
            .unwrap();

        let outcome = engine.process("electrician price").await.unwrap();
        let source = &outcome.sources[0];
        assert!(source.content.ends_with("..."));
        assert_eq!(source.content.chars().count(), SOURCE_PREVIEW_CHARS + 3);
        // relevance_score round-trips 1 - distance back to the raw similarity
        assert!(source.relevance_score > 0.0 && source.relevance_score <= 1.0);
    }

    #[tokio::test]
    async fn test_populate_routes_and_counts() {
        let engine = test_engine("populate", Box::new(DownProvider));
        let batch: CatalogBatch = serde_json::from_value(serde_json::json!({
            "general_content": {
                "company_name": "Servecure",
                "tagline": "Home services you can trust",
                "description": "Verified professionals",
                "services_offered": ["Electrician", "Plumber"],
                "how_it_works": ["Search", "Book", "Relax"],
                "key_features": ["Verified pros"]
            },
            "services": [
                {"title": "Electrician", "sub_services": ["Wiring"], "starting_price": "₹299", "description": "Licensed"},
                {"title": "Plumber", "sub_services": ["Leaks"], "starting_price": "₹399", "description": "Fast"}
            ],
            "job_listings": [
                {"id": "eng-1", "title": "Backend Developer", "department": "Engineering",
                 "location": "Mumbai", "experience": "3+", "salary": "₹20 LPA",
                 "skills": ["Rust"], "type": "Full-time", "description": "APIs"}
            ]
        }))
        .unwrap();

        let stats = engine.populate(&batch).await.unwrap();
        assert_eq!(stats["general"], 4);
        assert_eq!(stats["services"], 2);
        assert_eq!(stats["careers"], 1);

        let hits = engine
            .index()
            .search("plumber leaks", Some(&[Collection::Services]), 5)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_preview_keeps_short_content_untouched() {
        assert_eq!(preview("short", 200), "short");
        let exact: String = "a".repeat(200);
        assert_eq!(preview(&exact, 200), exact);
    }

    #[test]
    fn test_preview_cuts_on_char_boundary() {
        let content = "₹".repeat(250);
        let cut = preview(&content, 200);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }
}
