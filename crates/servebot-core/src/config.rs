//! Servebot configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServebotConfig {
    /// Global API key, used by any backend whose section leaves its own empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Default for ServebotConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            index: IndexConfig::default(),
            gateway: GatewayConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl ServebotConfig {
    /// Load config from the default path (~/.servebot/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::ServebotError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| crate::error::ServebotError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ServebotError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Servebot home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".servebot")
    }

    /// Directory the index snapshot / database lives in.
    pub fn data_dir(&self) -> PathBuf {
        if self.index.data_dir.is_empty() {
            Self::home_dir().join("data")
        } else {
            PathBuf::from(&self.index.data_dir)
        }
    }
}

/// Generation backend (LLM) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Endpoint override; empty means the provider's default base URL.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_provider() -> String { "openai".into() }
fn default_llm_model() -> String { "gpt-4o-mini".into() }
fn default_max_tokens() -> u32 { 1000 }
fn default_temperature() -> f32 { 0.7 }
fn default_timeout_secs() -> u64 { 30 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            endpoint: String::new(),
            api_key: String::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Embedding backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Vector dimension, fixed for the life of the index.
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_embedding_model() -> String { "text-embedding-ada-002".into() }
fn default_dimension() -> usize { 1536 }
fn default_embedding_endpoint() -> String { "https://api.openai.com/v1".into() }

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimension: default_dimension(),
            endpoint: default_embedding_endpoint(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Similarity index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Backing store: "memory" (array scan + JSON snapshot) or "sqlite".
    #[serde(default = "default_index_backend")]
    pub backend: String,
    /// Data directory; empty means ~/.servebot/data.
    #[serde(default)]
    pub data_dir: String,
}

fn default_index_backend() -> String { "memory".into() }

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: default_index_backend(),
            data_dir: String::new(),
        }
    }
}

/// Gateway (HTTP surface) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty means allow any (development).
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8000 }
fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".into(), "http://localhost:3000".into()]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Catalog (content acquisition hand-off) configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// Path to a catalog batch JSON file used to seed an empty index at
    /// server start. Empty disables seeding.
    #[serde(default)]
    pub seed_path: String,
}
