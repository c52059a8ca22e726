use async_trait::async_trait;

use crate::domain::{DomainError, Embedding, VectorMatch};

/// Vector storage and similarity search operations.
///
/// `upsert` is insert-or-replace keyed by document id, so re-indexing the
/// same collection never produces duplicate entries.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn upsert(&self, embeddings: &[Embedding]) -> Result<(), DomainError>;

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}
