use async_trait::async_trait;

use crate::domain::{Document, DomainError, Embedding, EmbeddingConfig};

/// Generates vector embeddings from documents and queries.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed_document(&self, document: &Document) -> Result<Embedding, DomainError>;

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError>;

    fn config(&self) -> &EmbeddingConfig;
}
