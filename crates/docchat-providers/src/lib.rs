//! # docchat providers
//!
//! One client for every OpenAI-compatible API (OpenRouter, OpenAI, local
//! llama.cpp/Ollama servers): chat completions for answering and the
//! `/embeddings` endpoint for vectorizing chunks and questions. Providers
//! differ only by endpoint URL and API key.

pub mod openai_compatible;

pub use openai_compatible::OpenAiCompatibleProvider;

use std::sync::Arc;

use docchat_core::Result;
use docchat_core::config::DocChatConfig;
use docchat_core::traits::{CompletionProvider, Embedder};

/// Build the shared provider and hand it out under both collaborator
/// traits. The same HTTP client serves embeddings and completions.
pub fn create_provider(
    config: &DocChatConfig,
) -> Result<(Arc<dyn Embedder>, Arc<dyn CompletionProvider>)> {
    let provider = Arc::new(OpenAiCompatibleProvider::from_config(config)?);
    Ok((provider.clone(), provider))
}
