//! OpenAI-compatible embeddings client.

use async_trait::async_trait;
use serde_json::{Value, json};

use servebot_core::config::ServebotConfig;
use servebot_core::traits::Embedder;

/// Embedding gateway backed by an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbedder {
    model: String,
    dimension: usize,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiEmbedder {
    /// Create from configuration.
    ///
    /// API key resolution: `[embedding] api_key` > top-level `api_key` >
    /// `OPENAI_API_KEY` env var > empty.
    pub fn from_config(config: &ServebotConfig) -> Self {
        let api_key = if !config.embedding.api_key.is_empty() {
            config.embedding.api_key.clone()
        } else if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            std::env::var("OPENAI_API_KEY").unwrap_or_default()
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.embedding.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            model: config.embedding.model.clone(),
            dimension: config.embedding.dimension,
            api_key,
            base_url: config.embedding.endpoint.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn zeros(&self) -> Vec<f32> {
        vec![0.0; self.dimension]
    }

    /// One round-trip to the backend. Any error here means zero vectors for
    /// the whole batch; the caller logs it.
    async fn request_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, String> {
        let url = format!("{}/embeddings", self.base_url);
        let body = json!({
            "model": self.model,
            "input": texts,
        });

        let mut req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let resp = req
            .send()
            .await
            .map_err(|e| format!("connection failed ({url}): {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("API error {status}: {text}"));
        }

        let payload: Value = resp.json().await.map_err(|e| e.to_string())?;
        let items = payload["data"]
            .as_array()
            .ok_or_else(|| "no data array in response".to_string())?;
        if items.len() != texts.len() {
            return Err(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                items.len()
            ));
        }

        // Restore input order from the per-item index field.
        let mut vectors: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        for item in items {
            let idx = item["index"].as_u64().ok_or("missing index field")? as usize;
            let values = item["embedding"]
                .as_array()
                .ok_or("missing embedding field")?;
            let vector: Vec<f32> = values
                .iter()
                .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                .collect();
            if vector.len() != self.dimension {
                return Err(format!(
                    "embedding dimension {} does not match configured {}",
                    vector.len(),
                    self.dimension
                ));
            }
            if idx >= vectors.len() {
                return Err(format!("index {idx} out of range"));
            }
            vectors[idx] = Some(vector);
        }

        vectors
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| "response missing embeddings for some inputs".to_string())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> Vec<Vec<f32>> {
        if texts.is_empty() {
            return Vec::new();
        }

        match self.request_embeddings(texts).await {
            Ok(vectors) => vectors,
            Err(e) => {
                tracing::warn!(
                    "⚠️ Embedding backend failed, returning zero vectors for {} text(s): {e}",
                    texts.len()
                );
                texts.iter().map(|_| self.zeros()).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_embedder() -> OpenAiEmbedder {
        let mut config = ServebotConfig::default();
        config.embedding.endpoint = "http://127.0.0.1:9".into();
        config.embedding.dimension = 8;
        config.embedding.timeout_secs = 2;
        config.embedding.api_key = "test-key".into();
        OpenAiEmbedder::from_config(&config)
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_to_zero_vectors() {
        let embedder = unreachable_embedder();
        let texts = vec!["hello".to_string(), "world".to_string()];
        let vectors = embedder.embed(&texts).await;
        assert_eq!(vectors.len(), 2);
        for v in &vectors {
            assert_eq!(v.len(), 8);
            assert!(v.iter().all(|x| *x == 0.0));
        }
    }

    #[tokio::test]
    async fn test_embed_one_matches_dimension_on_failure() {
        let embedder = unreachable_embedder();
        let v = embedder.embed_one("anything").await;
        assert_eq!(v.len(), 8);
    }

    #[tokio::test]
    async fn test_empty_batch_short_circuits() {
        let embedder = unreachable_embedder();
        assert!(embedder.embed(&[]).await.is_empty());
    }
}
