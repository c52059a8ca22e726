use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::EmbeddingService;
use crate::domain::{Document, DomainError, Embedding, EmbeddingConfig};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const EMBED_PATH: &str = "/v1beta2/models/embedding-gecko-001:embedText";
const MODEL_NAME: &str = "embedding-gecko-001";
/// Gemini gecko embeddings are 768 dimensions.
const DIMENSIONS: usize = 768;

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    embedding: EmbeddingValue,
}

#[derive(Deserialize)]
struct EmbeddingValue {
    value: Vec<f32>,
}

/// HTTP client for the Gemini text embedding API.
///
/// The API key is passed as a `key` query parameter, matching the Gemini
/// REST convention. Each call is independent: no retry, no caching.
/// Transport and non-2xx failures become [`DomainError::Embedding`];
/// a body that doesn't carry a vector becomes [`DomainError::InvalidResponse`].
pub struct GeminiEmbedding {
    client: reqwest::Client,
    api_key: String,
    url: String,
    config: EmbeddingConfig,
}

impl GeminiEmbedding {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        let url = format!("{}{EMBED_PATH}", base.trim_end_matches('/'));
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            url,
            config: EmbeddingConfig::new(MODEL_NAME.to_string(), DIMENSIONS),
        }
    }

    /// Construct from environment variables:
    /// - `GEMINI_API_KEY`  — required; missing key is a configuration error
    ///   at startup rather than an auth failure on the first request
    /// - `GEMINI_BASE_URL` — optional override, defaults to the Google endpoint
    pub fn from_env() -> Result<Self, DomainError> {
        let key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| DomainError::configuration("GEMINI_API_KEY is not set"))?;
        let base =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(key, base))
    }

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&ApiRequest { text })
            .send()
            .await
            .map_err(|e| DomainError::embedding(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("GeminiEmbedding: API returned {status}: {body}");
            return Err(DomainError::embedding(format!("API returned {status}")));
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            DomainError::invalid_response(format!("embedding response did not parse: {e}"))
        })?;

        if api_response.embedding.value.is_empty() {
            return Err(DomainError::invalid_response(
                "embedding response carried an empty vector",
            ));
        }

        debug!(
            "Generated embedding with {} dimensions",
            api_response.embedding.value.len()
        );

        Ok(api_response.embedding.value)
    }
}

#[async_trait]
impl EmbeddingService for GeminiEmbedding {
    async fn embed_document(&self, document: &Document) -> Result<Embedding, DomainError> {
        let vector = self.embed_text(document.text()).await?;
        Ok(Embedding::new(
            document.id().to_string(),
            vector,
            self.config.model_name().to_string(),
        ))
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        self.embed_text(query).await
    }

    fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn embed_query_returns_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(EMBED_PATH))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "embedding": { "value": [0.1, 0.2, 0.3] }
            })))
            .mount(&server)
            .await;

        let service = GeminiEmbedding::new("test-key", server.uri());
        let vector = service.embed_query("hello").await.unwrap();

        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn embed_document_carries_document_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(EMBED_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "embedding": { "value": [1.0, 0.0] }
            })))
            .mount(&server)
            .await;

        let service = GeminiEmbedding::new("test-key", server.uri());
        let document = Document::new("7", "What is the refund policy?");
        let embedding = service.embed_document(&document).await.unwrap();

        assert_eq!(embedding.document_id(), "7");
        assert_eq!(embedding.model(), MODEL_NAME);
    }

    #[tokio::test]
    async fn server_error_is_an_embedding_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(EMBED_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let service = GeminiEmbedding::new("test-key", server.uri());
        let err = service.embed_query("hello").await.unwrap_err();

        assert!(matches!(err, DomainError::Embedding(_)));
    }

    #[tokio::test]
    async fn malformed_body_is_an_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(EMBED_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
            .mount(&server)
            .await;

        let service = GeminiEmbedding::new("test-key", server.uri());
        let err = service.embed_query("hello").await.unwrap_err();

        assert!(err.is_invalid_response());
    }
}
