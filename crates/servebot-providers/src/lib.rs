//! # Servebot Providers
//!
//! Text-generation backend clients. Every backend this system talks to
//! speaks the OpenAI chat-completions format, so a single
//! [`OpenAiCompatibleProvider`] covers them all; self-hosted servers are
//! reached with a `custom:<url>` provider name or an endpoint override.

pub mod openai_compatible;

pub use openai_compatible::OpenAiCompatibleProvider;

use servebot_core::config::ServebotConfig;
use servebot_core::error::{Result, ServebotError};
use servebot_core::traits::Provider;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Create a provider from configuration, keyed by `[llm] provider`.
pub fn create_provider(config: &ServebotConfig) -> Result<Box<dyn Provider>> {
    match config.llm.provider.as_str() {
        "openai" => Ok(Box::new(OpenAiCompatibleProvider::new(
            "openai",
            OPENAI_BASE_URL,
            config,
        ))),

        // Custom endpoint: "custom:https://my-server.com/v1"
        other if other.starts_with("custom:") => {
            let base_url = other.trim_start_matches("custom:").trim_end_matches('/');
            Ok(Box::new(OpenAiCompatibleProvider::new(
                "custom", base_url, config,
            )))
        }

        other => Err(ServebotError::ProviderNotFound(other.to_string())),
    }
}
