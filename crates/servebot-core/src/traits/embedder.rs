//! Embedding backend seam.

use async_trait::async_trait;

/// Turns text into fixed-dimension vectors.
///
/// The signature is deliberately infallible: on any backend failure an
/// implementation returns an all-zero vector of `dimension()` length per
/// input and reports the failure through logging only. A zero vector scores
/// cosine similarity 0 against everything, so a degraded embedding loses
/// ranking relevance instead of aborting the request.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;

    /// Vector length, fixed at construction time.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts. Same length as the input, order-preserving.
    async fn embed(&self, texts: &[String]) -> Vec<Vec<f32>>;

    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> Vec<f32> {
        let texts = [text.to_string()];
        self.embed(&texts)
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| vec![0.0; self.dimension()])
    }
}
