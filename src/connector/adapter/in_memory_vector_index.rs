use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::VectorIndex;
use crate::domain::{DomainError, Embedding, VectorMatch};

/// In-process stand-in for the remote vector index.
///
/// Same contract as the Pinecone adapter: replace-by-id upserts and
/// cosine-ranked queries.
pub struct InMemoryVectorIndex {
    vectors: Arc<Mutex<HashMap<String, Vec<f32>>>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self {
            vectors: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, embeddings: &[Embedding]) -> Result<(), DomainError> {
        let mut store = self.vectors.lock().await;

        for embedding in embeddings {
            store.insert(
                embedding.document_id().to_string(),
                embedding.vector().to_vec(),
            );
        }

        debug!("Stored {} vectors in memory", embeddings.len());
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, DomainError> {
        let store = self.vectors.lock().await;

        let mut scored: Vec<VectorMatch> = store
            .iter()
            .map(|(id, stored)| VectorMatch::new(id.clone(), cosine_similarity(vector, stored)))
            .collect();

        scored.sort_by(|a, b| {
            b.score()
                .partial_cmp(&a.score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        Ok(scored)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let store = self.vectors.lock().await;
        Ok(store.len() as u64)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedding(id: &str, vector: Vec<f32>) -> Embedding {
        Embedding::new(id.to_string(), vector, "test".to_string())
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let index = InMemoryVectorIndex::new();

        index
            .upsert(&[embedding("0", vec![1.0, 0.0])])
            .await
            .unwrap();
        index
            .upsert(&[embedding("0", vec![0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(index.count().await.unwrap(), 1);

        let matches = index.query(&[0.0, 1.0], 1).await.unwrap();
        assert_eq!(matches[0].id(), "0");
        assert!(matches[0].score() > 0.99);
    }

    #[tokio::test]
    async fn query_ranks_by_cosine_similarity() {
        let index = InMemoryVectorIndex::new();

        index
            .upsert(&[
                embedding("near", vec![1.0, 0.1]),
                embedding("far", vec![0.0, 1.0]),
                embedding("mid", vec![0.7, 0.7]),
            ])
            .await
            .unwrap();

        let matches = index.query(&[1.0, 0.0], 2).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id(), "near");
        assert_eq!(matches[1].id(), "mid");
    }

    #[tokio::test]
    async fn query_honors_top_k() {
        let index = InMemoryVectorIndex::new();

        for i in 0..10 {
            index
                .upsert(&[embedding(&i.to_string(), vec![1.0, i as f32])])
                .await
                .unwrap();
        }

        let matches = index.query(&[1.0, 0.0], 3).await.unwrap();
        assert_eq!(matches.len(), 3);
    }
}
