//! Unified OpenAI-compatible chat-completions client.
//!
//! Different backends are distinguished only by endpoint URL and API key;
//! the request/response wire format is the same everywhere.

use async_trait::async_trait;
use serde_json::{Value, json};

use servebot_core::config::ServebotConfig;
use servebot_core::error::{Result, ServebotError};
use servebot_core::traits::provider::{GenerateParams, Provider};
use servebot_core::types::Message;

pub struct OpenAiCompatibleProvider {
    /// Provider name (e.g., "openai", "custom").
    name: String,
    /// API key for authentication; empty means unauthenticated (local server).
    api_key: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    base_url: String,
    /// Whether this endpoint requires an API key at all.
    requires_auth: bool,
    /// HTTP client.
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Create a provider for a named backend.
    ///
    /// Resolution order:
    /// - API key: `[llm] api_key` > top-level `api_key` > `OPENAI_API_KEY`
    /// - Base URL: `[llm] endpoint` > `base_url` argument
    pub fn new(name: &str, base_url: &str, config: &ServebotConfig) -> Self {
        let api_key = if !config.llm.api_key.is_empty() {
            config.llm.api_key.clone()
        } else if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            std::env::var("OPENAI_API_KEY").unwrap_or_default()
        };

        let base_url = if !config.llm.endpoint.is_empty() {
            config.llm.endpoint.trim_end_matches('/').to_string()
        } else {
            base_url.trim_end_matches('/').to_string()
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.llm.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            name: name.to_string(),
            api_key,
            base_url,
            requires_auth: name != "custom",
            client,
        }
    }
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(&self, messages: &[Message], params: &GenerateParams) -> Result<String> {
        if self.requires_auth && self.api_key.is_empty() {
            return Err(ServebotError::ApiKeyMissing(self.name.clone()));
        }

        let body = json!({
            "model": params.model,
            "messages": messages,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });

        let url = format!("{}/chat/completions", self.base_url);
        let mut req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let resp = req.send().await.map_err(|e| {
            ServebotError::Http(format!("{} connection failed ({}): {}", self.name, url, e))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ServebotError::Provider(format!(
                "{} API error {}: {}",
                self.name, status, text
            )));
        }

        let payload: Value = resp
            .json()
            .await
            .map_err(|e| ServebotError::Http(e.to_string()))?;

        let content = payload["choices"]
            .get(0)
            .and_then(|choice| choice["message"]["content"].as_str())
            .ok_or_else(|| ServebotError::Provider("No choices in response".into()))?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servebot_core::types::Role;

    #[test]
    fn test_api_key_resolution_prefers_llm_section() {
        let mut config = ServebotConfig::default();
        config.api_key = "global-key".into();
        config.llm.api_key = "llm-key".into();
        let provider = OpenAiCompatibleProvider::new("openai", "https://api.openai.com/v1", &config);
        assert_eq!(provider.api_key, "llm-key");
    }

    #[test]
    fn test_endpoint_override_wins() {
        let mut config = ServebotConfig::default();
        config.llm.endpoint = "http://localhost:11434/v1/".into();
        let provider = OpenAiCompatibleProvider::new("openai", "https://api.openai.com/v1", &config);
        assert_eq!(provider.base_url, "http://localhost:11434/v1");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_an_explicit_error() {
        let mut config = ServebotConfig::default();
        config.llm.timeout_secs = 2;
        // Make sure no ambient key leaks into the test.
        unsafe { std::env::remove_var("OPENAI_API_KEY") };
        let provider = OpenAiCompatibleProvider::new("openai", "https://api.openai.com/v1", &config);
        let messages = [Message::system("s"), Message::user("q")];
        let params = GenerateParams {
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            max_tokens: 16,
        };
        let err = provider.chat(&messages, &params).await.unwrap_err();
        assert!(matches!(err, ServebotError::ApiKeyMissing(_)));
        assert_eq!(messages[0].role, Role::System);
    }
}
