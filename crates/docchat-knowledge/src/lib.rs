//! # docchat retrieval core
//!
//! Everything between raw document text and an LLM-ready context block:
//!
//! - **Chunking** — split extracted text into word-bounded retrieval units
//! - **ChunkStore** — SQLite persistence for (text, embedding, document)
//!   tuples; exactly one document's corpus exists at a time
//! - **VectorIndex** — in-memory exact k-nearest-neighbor search over the
//!   stored vectors, rebuildable wholesale from the store
//! - **RetrievalService** — ingestion, querying, deletion, and
//!   restart recovery on top of the three pieces above
//!
//! ## How a question is answered
//! ```text
//! POST /chat {"question": ...}
//!   ↓
//! RetrievalService::answer
//!   ↓ embed(question), k-NN over the warm index
//! Top-k chunk texts, nearest first
//!   ↓
//! Joined into one context block, sent with the question to the LLM
//!   ↓
//! Grounded answer (or the fixed no-content reply if nothing is indexed)
//! ```

pub mod chunker;
pub mod index;
pub mod service;
pub mod store;

pub use index::VectorIndex;
pub use service::{NO_CONTENT_ANSWER, RetrievalService};
pub use store::ChunkStore;
