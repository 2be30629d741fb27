//! docchat configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DocChatError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocChatConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for DocChatConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            storage: StorageConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl DocChatConfig {
    /// Load config from the default path (~/.docchat/config.toml).
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
            .map_err(|e| DocChatError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| DocChatError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| DocChatError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the docchat home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".docchat")
    }

    /// Reject values the retrieval core cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.chunk_words == 0 {
            return Err(DocChatError::Config(
                "retrieval.chunk_words must be at least 1".into(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(DocChatError::Config(
                "retrieval.top_k must be at least 1".into(),
            ));
        }
        if self.embedding.dimension == 0 {
            return Err(DocChatError::Config(
                "embedding.dimension must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Resolved SQLite path with `~` and env vars expanded.
    pub fn db_path(&self) -> PathBuf {
        let expanded = shellexpand::full(&self.storage.db_path)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| self.storage.db_path.clone());
        PathBuf::from(expanded)
    }
}

/// LLM completion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider() -> String {
    "openrouter".into()
}
fn default_endpoint() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_model() -> String {
    "google/gemma-3-12b-it:free".into()
}
fn default_max_tokens() -> u32 {
    500
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: String::new(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Embedding model configuration.
///
/// An empty `endpoint` means "reuse `llm.endpoint`". The dimension must
/// match what the model actually returns; the provider checks every vector
/// against it and fails fast on mismatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_dimension() -> usize {
    384
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            model: default_embedding_model(),
            dimension: default_dimension(),
        }
    }
}

/// Retrieval tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Words per chunk. Small on purpose: each retrieval unit stays
    /// tightly focused on one passage.
    #[serde(default = "default_chunk_words")]
    pub chunk_words: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_chunk_words() -> usize {
    30
}
fn default_top_k() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_words: default_chunk_words(),
            top_k: default_top_k(),
        }
    }
}

/// Persistent chunk store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    "~/.docchat/chunks.db".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    5000
}
fn default_allowed_origin() -> String {
    "http://localhost:8000".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origin: default_allowed_origin(),
        }
    }
}
