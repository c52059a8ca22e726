use std::sync::Arc;

use tracing::{info, warn};

use crate::application::{EmbeddingService, VectorIndex};
use crate::domain::DomainError;

pub const DEFAULT_TOP_K: usize = 3;

pub struct RetrieveDocumentsUseCase {
    vector_index: Arc<dyn VectorIndex>,
    embedding_service: Arc<dyn EmbeddingService>,
    top_k: usize,
}

impl RetrieveDocumentsUseCase {
    pub fn new(
        vector_index: Arc<dyn VectorIndex>,
        embedding_service: Arc<dyn EmbeddingService>,
    ) -> Self {
        Self {
            vector_index,
            embedding_service,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Return the ids of the nearest stored documents, in the index's rank
    /// order. A query embedding failure is recovered into an empty result,
    /// never an error — the caller decides how to surface that.
    pub async fn execute(&self, query: &str) -> Result<Vec<String>, DomainError> {
        let query_embedding = match self.embedding_service.embed_query(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("Could not generate embedding for query: {}", e);
                return Ok(vec![]);
            }
        };

        let matches = self
            .vector_index
            .query(&query_embedding, self.top_k)
            .await?;

        info!("Retrieved {} matches for query", matches.len());

        // The index is expected to honor top_k; truncate in case it doesn't.
        Ok(matches
            .into_iter()
            .take(self.top_k)
            .map(|m| m.into_id())
            .collect())
    }
}
