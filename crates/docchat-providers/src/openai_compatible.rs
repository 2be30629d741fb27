//! Unified OpenAI-compatible provider.
//!
//! A single struct that handles both chat completions and embeddings for
//! any OpenAI-compatible API. The original deployment targets OpenRouter;
//! OpenAI itself and local servers exposing the same surface work by
//! changing the endpoint.

use async_trait::async_trait;
use serde_json::{Value, json};

use docchat_core::config::DocChatConfig;
use docchat_core::error::{DocChatError, Result};
use docchat_core::traits::{CompletionProvider, Embedder};

pub struct OpenAiCompatibleProvider {
    /// API key for authentication; bearer auth is skipped when empty
    /// (local servers).
    api_key: String,
    /// Base URL for chat completions (e.g. "https://openrouter.ai/api/v1").
    base_url: String,
    /// Base URL for embeddings; may differ when a local embedding server
    /// sits next to a cloud LLM.
    embeddings_url: String,
    /// Chat model id.
    model: String,
    /// Embedding model id.
    embedding_model: String,
    /// Expected embedding dimension; every returned vector is checked
    /// against it.
    dimension: usize,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Create from config.
    ///
    /// API key resolution: `llm.api_key` > `OPENROUTER_API_KEY` >
    /// `OPENAI_API_KEY` > empty. An empty `embedding.endpoint` reuses the
    /// LLM endpoint.
    pub fn from_config(config: &DocChatConfig) -> Result<Self> {
        let api_key = if !config.llm.api_key.is_empty() {
            config.llm.api_key.clone()
        } else {
            std::env::var("OPENROUTER_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .unwrap_or_default()
        };

        let base_url = config.llm.endpoint.trim_end_matches('/').to_string();
        let embeddings_url = if config.embedding.endpoint.is_empty() {
            base_url.clone()
        } else {
            config.embedding.endpoint.trim_end_matches('/').to_string()
        };

        Ok(Self {
            api_key,
            base_url,
            embeddings_url,
            model: config.llm.model.clone(),
            embedding_model: config.embedding.model.clone(),
            dimension: config.embedding.dimension,
            max_tokens: config.llm.max_tokens,
            client: reqwest::Client::new(),
        })
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            req
        } else {
            req.header("Authorization", format!("Bearer {}", self.api_key))
        }
    }
}

#[async_trait]
impl Embedder for OpenAiCompatibleProvider {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.embeddings_url);
        let body = json!({
            "model": self.embedding_model,
            "input": text,
        });

        let req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        let resp = self
            .apply_auth(req)
            .send()
            .await
            .map_err(|e| DocChatError::Http(format!("embeddings connection failed ({url}): {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(DocChatError::Embedding(format!(
                "embeddings API error {status}: {text}"
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| DocChatError::Embedding(e.to_string()))?;
        let vector: Vec<f32> = json["data"]
            .get(0)
            .and_then(|d| d["embedding"].as_array())
            .ok_or_else(|| DocChatError::Embedding("No embedding in response".into()))?
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        // A model returning the wrong width is a deployment mistake, not
        // something to paper over by truncating or padding.
        if vector.len() != self.dimension {
            return Err(DocChatError::Config(format!(
                "embedding model '{}' returned dimension {}, configured dimension is {}",
                self.embedding_model,
                vector.len(),
                self.dimension
            )));
        }
        tracing::debug!(model = %self.embedding_model, chars = text.len(), "Embedded text");
        Ok(vector)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    async fn complete(&self, system_messages: &[String], user_message: &str) -> Result<String> {
        let mut messages: Vec<Value> = system_messages
            .iter()
            .map(|content| json!({"role": "system", "content": content}))
            .collect();
        messages.push(json!({"role": "user", "content": user_message}));

        let body = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": self.max_tokens,
        });

        let url = format!("{}/chat/completions", self.base_url);
        let req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        let resp = self
            .apply_auth(req)
            .send()
            .await
            .map_err(|e| DocChatError::Http(format!("completion connection failed ({url}): {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(DocChatError::Completion(format!(
                "completions API error {status}: {text}"
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| DocChatError::Completion(e.to_string()))?;
        let content = json["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .ok_or_else(|| DocChatError::Completion("No choices in response".into()))?;

        tracing::debug!(model = %self.model, chars = content.len(), "Completion received");
        Ok(content.to_string())
    }
}
