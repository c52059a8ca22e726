//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Embedding and answer generation (Gemini REST API)
//! - Vector storage (Pinecone REST API, in-memory for tests)

pub mod adapter;

pub use adapter::*;
