//! # docchat gateway
//!
//! The HTTP surface of docchat: a small Axum server that accepts a
//! document upload, answers questions against it, reports which document
//! is loaded, and deletes it. One document at a time; uploading a new one
//! replaces the old.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
