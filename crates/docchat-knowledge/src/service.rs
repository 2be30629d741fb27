//! The retrieval service: ingestion, querying, deletion, recovery.
//!
//! One instance per process. The vector index is the only shared mutable
//! state; it sits behind an `RwLock` so ingestion and deletion take
//! exclusive access while queries share read access. Collaborator calls
//! (embedding, completion) always complete before a lock is taken, so no
//! guard is ever held across an await.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use docchat_core::error::{DocChatError, Result};
use docchat_core::traits::{CompletionProvider, Embedder};
use docchat_core::types::StoredChunk;

use crate::chunker;
use crate::index::VectorIndex;
use crate::store::ChunkStore;

/// Fixed reply when no document has been ingested (or it was deleted).
/// Returned without calling the completion collaborator.
pub const NO_CONTENT_ANSWER: &str = "No PDF content available. Please upload a PDF first.";

/// Separates retrieved chunks inside the context block sent to the LLM.
const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

pub struct RetrievalService {
    store: ChunkStore,
    index: RwLock<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    completion: Arc<dyn CompletionProvider>,
    chunk_words: usize,
    top_k: usize,
}

impl RetrievalService {
    /// Build the service and warm the index from whatever the store
    /// currently holds, so a restarted process serves the last ingested
    /// document without a re-upload. Fails fast if any stored vector
    /// disagrees with the embedder's dimension.
    pub fn new(
        store: ChunkStore,
        embedder: Arc<dyn Embedder>,
        completion: Arc<dyn CompletionProvider>,
        chunk_words: usize,
        top_k: usize,
    ) -> Result<Self> {
        if chunk_words == 0 {
            return Err(DocChatError::Config(
                "chunk_words must be at least 1".into(),
            ));
        }
        if top_k == 0 {
            return Err(DocChatError::Config("top_k must be at least 1".into()));
        }

        let mut index = VectorIndex::new();
        let recovered = index.rebuild(&store)?;
        index.verify_dimension(embedder.dimension())?;
        if recovered > 0 {
            tracing::info!("Recovered {recovered} chunks from the store into the vector index");
        }

        Ok(Self {
            store,
            index: RwLock::new(index),
            embedder,
            completion,
            chunk_words,
            top_k,
        })
    }

    /// Ingest a document, superseding any previously ingested one.
    ///
    /// Chunks the text, embeds every chunk, swaps the store contents in a
    /// single transaction, then rebuilds the index from the same in-memory
    /// sequence just persisted. If embedding or storage fails partway the
    /// previous corpus stays intact. Returns the number of chunks
    /// ingested; an empty document clears the corpus and returns zero.
    pub async fn ingest(&self, document_text: &str, document_id: &str) -> Result<usize> {
        let texts = chunker::chunk_words(document_text, self.chunk_words)?;
        if texts.is_empty() {
            tracing::warn!(document_id, "Document produced no chunks; clearing corpus");
            let mut index = self.write_index()?;
            self.store.clear()?;
            index.clear();
            return Ok(0);
        }

        let dimension = self.embedder.dimension();
        let mut chunks = Vec::with_capacity(texts.len());
        for text in texts {
            let embedding = self.embedder.embed(&text).await?;
            if embedding.len() != dimension {
                return Err(DocChatError::Config(format!(
                    "embedder returned a vector of dimension {}, expected {dimension}",
                    embedding.len()
                )));
            }
            chunks.push(StoredChunk::new(text, embedding, document_id));
        }

        let count = chunks.len();
        {
            // Exclusive access for the whole cutover: the transactional
            // store swap and the index rebuild happen under one write
            // lock, so readers see the old corpus or the new one, never a
            // mixture.
            let mut index = self.write_index()?;
            self.store.replace_all(&chunks)?;
            index.rebuild_from_pairs(chunks.into_iter().map(|c| (c.embedding, c.text)));
        }

        tracing::info!(document_id, chunks = count, "Document ingested");
        Ok(count)
    }

    /// Texts of the `k` stored chunks nearest to `question`, nearest
    /// first. Empty when nothing is ingested.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<String>> {
        if self.read_index()?.is_empty() {
            return Ok(Vec::new());
        }
        let query = self.embedder.embed(question).await?;
        self.read_index()?.search(&query, k)
    }

    /// Answer `question` from the retrieved context. `top_k` falls back to
    /// the configured default. With no ingested document the fixed
    /// no-content reply is returned and the completion collaborator is
    /// never called.
    pub async fn answer(&self, question: &str, top_k: Option<usize>) -> Result<String> {
        let k = top_k.unwrap_or(self.top_k);
        if k == 0 {
            return Err(DocChatError::Config("top_k must be at least 1".into()));
        }

        let hits = self.retrieve(question, k).await?;
        if hits.is_empty() {
            // Nothing ingested, or a delete raced this query.
            return Ok(NO_CONTENT_ANSWER.to_string());
        }

        let context = hits.join(CONTEXT_DELIMITER);
        let system = vec![format!(
            "You are an assistant that answers questions based on the provided \
             content of a PDF. Answer only from this content; if the answer is \
             not in it, say so. Here is the content:\n{context}"
        )];
        let answer = self.completion.complete(&system, question).await?;
        Ok(answer.trim().to_string())
    }

    /// Remove the stored corpus and empty the index. Idempotent: deleting
    /// with nothing stored succeeds.
    pub fn delete(&self) -> Result<()> {
        let mut index = self.write_index()?;
        self.store.clear()?;
        index.clear();
        tracing::info!("Document corpus deleted");
        Ok(())
    }

    /// Identifier of the currently stored document, if any.
    pub fn status(&self) -> Result<Option<String>> {
        self.store.status()
    }

    fn read_index(&self) -> Result<RwLockReadGuard<'_, VectorIndex>> {
        self.index
            .read()
            .map_err(|_| DocChatError::Storage("vector index lock poisoned".into()))
    }

    fn write_index(&self) -> Result<RwLockWriteGuard<'_, VectorIndex>> {
        self.index
            .write()
            .map_err(|_| DocChatError::Storage("vector index lock poisoned".into()))
    }
}
