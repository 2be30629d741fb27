//! docchat error taxonomy.

use thiserror::Error;

/// All failure modes surfaced by the docchat crates.
///
/// `Config` errors are fatal and never retried. A `Storage` failure from
/// `replace_all` leaves the previously stored corpus intact, so callers may
/// retry the whole operation. `Embedding` and `Completion` are collaborator
/// failures; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum DocChatError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DocChatError>;
