//! Domain types shared by the store, index, and service.

use serde::{Deserialize, Serialize};

/// A persisted chunk: a word-bounded slice of the active document together
/// with its embedding vector and the identifier of the owning document.
///
/// A chunk is only ever constructed with an embedding already attached; a
/// chunk without a vector never reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub text: String,
    pub embedding: Vec<f32>,
    pub document_id: String,
}

impl StoredChunk {
    pub fn new(
        text: impl Into<String>,
        embedding: Vec<f32>,
        document_id: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            embedding,
            document_id: document_id.into(),
        }
    }
}
