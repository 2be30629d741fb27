//! In-memory exact nearest-neighbor index.
//!
//! A derived, rebuildable cache over the chunk store: a position-aligned
//! sequence of (vector, text) pairs scanned brute-force at query time.
//! Corpus sizes are a few hundred vectors at most, so an exact L2 scan is
//! simpler than any tuned structure and fast enough.
//!
//! The index is not internally locked; `RetrievalService` wraps it in an
//! `RwLock` and serializes rebuilds against queries.

use docchat_core::error::{DocChatError, Result};

use crate::store::ChunkStore;

#[derive(Debug, Clone)]
struct IndexEntry {
    vector: Vec<f32>,
    text: String,
}

/// Exact k-NN index. Empty until the first rebuild or add; "warm" while it
/// holds at least one vector.
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the current contents and reload every (vector, text) pair
    /// from the store, preserving store order as position order. An empty
    /// store leaves the index empty. Returns the number of entries loaded.
    pub fn rebuild(&mut self, store: &ChunkStore) -> Result<usize> {
        let chunks = store.load_all()?;
        self.entries = chunks
            .into_iter()
            .map(|c| IndexEntry {
                vector: c.embedding,
                text: c.text,
            })
            .collect();
        Ok(self.entries.len())
    }

    /// Fresh construction from an in-memory sequence, used on the
    /// ingestion path right after the same pairs were persisted.
    pub fn rebuild_from_pairs(&mut self, pairs: impl IntoIterator<Item = (Vec<f32>, String)>) {
        self.entries = pairs
            .into_iter()
            .map(|(vector, text)| IndexEntry { vector, text })
            .collect();
    }

    /// Append a single pair without touching existing content.
    pub fn add(&mut self, vector: Vec<f32>, text: String) {
        self.entries.push(IndexEntry { vector, text });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Error if any stored vector disagrees with the expected embedding
    /// dimension. Run at startup so a model/config change is caught before
    /// the first query, not silently mis-scored.
    pub fn verify_dimension(&self, dimension: usize) -> Result<()> {
        if let Some(pos) = self
            .entries
            .iter()
            .position(|e| e.vector.len() != dimension)
        {
            return Err(DocChatError::Config(format!(
                "stored vector at position {pos} has dimension {}, expected {dimension}; \
                 re-upload the document after changing the embedding model",
                self.entries[pos].vector.len()
            )));
        }
        Ok(())
    }

    /// Texts of the `min(k, len)` stored vectors nearest to `query` by
    /// squared L2 distance, nearest first, ties broken by insertion
    /// position. An empty index yields an empty result, never an error.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<String>> {
        if k == 0 {
            return Err(DocChatError::Config("search k must be at least 1".into()));
        }
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f32, usize)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(pos, entry)| (l2_squared(query, &entry.vector), pos))
            .collect();
        scored.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, pos)| self.entries[pos].text.clone())
            .collect())
    }
}

fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
