//! Collaborator traits.
//!
//! The embedding model, the LLM completion call, and the PDF text
//! extraction are external to the retrieval core. Each is seamed off
//! behind a trait so the service can be exercised with deterministic
//! stand-ins in tests.

use async_trait::async_trait;

use crate::error::Result;

/// Maps text to a fixed-dimension f32 vector.
///
/// `dimension()` is constant for the process lifetime. Implementations
/// must return an error, not a truncated or padded vector, when the
/// backing model disagrees with the configured dimension.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Single-turn LLM completion.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, system_messages: &[String], user_message: &str) -> Result<String>;
}

/// Turns an uploaded file into plain text.
pub trait TextExtractor: Send + Sync {
    fn text_of(&self, filename: &str, bytes: &[u8]) -> Result<String>;
}
