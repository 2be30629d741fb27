//! # docchat core
//!
//! Shared foundation for the docchat crates: the error taxonomy, the TOML
//! configuration, the persisted chunk type, and the traits that seam off
//! the external collaborators (embedding model, LLM completion, text
//! extraction).

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{DocChatError, Result};
