use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use tracing::debug;

use crate::application::EmbeddingService;
use crate::domain::{Document, DomainError, Embedding, EmbeddingConfig};

/// Tokens too common to carry meaning; dropped before hashing so that
/// phrasing overlap ("how can I") doesn't swamp topical overlap ("refund").
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "at", "can", "do", "does", "for", "from", "how", "i", "in", "is",
    "it", "me", "my", "of", "on", "or", "the", "there", "to", "we", "what", "you", "your",
];

/// Deterministic embedding service for tests and offline runs.
///
/// Embeds text as a hashed bag of words: every non-stopword token is hashed
/// into one of the vector's dimensions and the result is L2-normalized.
/// Texts sharing content words land near each other under cosine
/// similarity, which is enough to exercise retrieval end to end without a
/// network.
pub struct MockEmbedding {
    config: EmbeddingConfig,
    failing_on: Option<String>,
}

impl MockEmbedding {
    pub fn new() -> Self {
        Self {
            config: EmbeddingConfig::new("mock-embedding".to_string(), 768),
            failing_on: None,
        }
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            config: EmbeddingConfig::new("mock-embedding".to_string(), dimensions),
            failing_on: None,
        }
    }

    /// Fail any embedding whose text contains `marker`. Used to exercise
    /// the skip-and-continue paths in indexing and retrieval.
    pub fn failing_on(marker: impl Into<String>) -> Self {
        Self {
            config: EmbeddingConfig::new("mock-embedding".to_string(), 768),
            failing_on: Some(marker.into()),
        }
    }

    fn check_failure(&self, text: &str) -> Result<(), DomainError> {
        if let Some(marker) = &self.failing_on {
            if text.contains(marker.as_str()) {
                return Err(DomainError::embedding(format!(
                    "injected failure for text containing {marker:?}"
                )));
            }
        }
        Ok(())
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.config.dimensions()
    }

    fn generate_embedding(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.config.dimensions()];

        let tokens = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase());

        let mut any_content_token = false;
        for token in tokens {
            if STOPWORDS.contains(&token.as_str()) {
                continue;
            }
            vector[self.bucket(&token)] += 1.0;
            any_content_token = true;
        }

        // All-stopword text still gets a stable non-zero vector.
        if !any_content_token {
            vector[self.bucket(&text.to_lowercase())] = 1.0;
        }

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for x in &mut vector {
                *x /= magnitude;
            }
        }

        vector
    }
}

impl Default for MockEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingService for MockEmbedding {
    async fn embed_document(&self, document: &Document) -> Result<Embedding, DomainError> {
        self.check_failure(document.text())?;
        let vector = self.generate_embedding(document.text());

        debug!(
            "Generated mock embedding for document {} with {} dimensions",
            document.id(),
            vector.len()
        );

        Ok(Embedding::new(
            document.id().to_string(),
            vector,
            self.config.model_name().to_string(),
        ))
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        self.check_failure(query)?;
        Ok(self.generate_embedding(query))
    }

    fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn embedding_is_deterministic() {
        let service = MockEmbedding::new();

        let first = service.embed_query("hello world").await.unwrap();
        let second = service.embed_query("hello world").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn embedding_is_normalized() {
        let service = MockEmbedding::new();

        let embedding = service.embed_query("track my order").await.unwrap();
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();

        assert!((magnitude - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn shared_content_words_score_higher_than_shared_stopwords() {
        let service = MockEmbedding::new();

        let query = service.embed_query("How can I get a refund?").await.unwrap();
        let refund = service
            .embed_query("What is the refund policy?")
            .await
            .unwrap();
        let support = service
            .embed_query("How can I contact customer support?")
            .await
            .unwrap();

        assert!(cosine(&query, &refund) > cosine(&query, &support));
    }

    #[tokio::test]
    async fn failure_marker_rejects_matching_text() {
        let service = MockEmbedding::failing_on("boom");

        let err = service.embed_query("this goes boom").await.unwrap_err();
        assert!(matches!(err, DomainError::Embedding(_)));

        assert!(service.embed_query("this is fine").await.is_ok());
    }

    #[tokio::test]
    async fn all_stopword_text_still_embeds() {
        let service = MockEmbedding::new();

        let embedding = service.embed_query("what is the").await.unwrap();
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();

        assert!((magnitude - 1.0).abs() < 0.001);
    }
}
