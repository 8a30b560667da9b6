//! Generation backend seam.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Message;

/// Sampling parameters for a generation call.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A text-generation backend (remote LLM).
///
/// Implementations surface failures as errors; the caller decides whether a
/// failure degrades to fallback text or propagates. The query engine never
/// propagates them (see the orchestration pipeline).
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Run a chat completion and return the generated text.
    async fn chat(&self, messages: &[Message], params: &GenerateParams) -> Result<String>;
}
