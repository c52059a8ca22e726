use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::VectorIndex;
use crate::domain::{DomainError, Embedding, VectorMatch};

const DEFAULT_CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
/// Gemini gecko embeddings are 768 dimensions.
const DIMENSIONS: u32 = 768;
const METRIC: &str = "cosine";
const CLOUD: &str = "aws";
const REGION: &str = "us-east-1";

#[derive(serde::Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: u32,
    metric: &'a str,
    spec: IndexSpec<'a>,
}

#[derive(serde::Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(serde::Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

/// Subset of the index description we need: the data-plane host.
#[derive(Deserialize)]
struct IndexDescription {
    host: String,
}

#[derive(serde::Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<VectorEntry<'a>>,
}

#[derive(serde::Serialize)]
struct VectorEntry<'a> {
    id: &'a str,
    values: &'a [f32],
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<MatchEntry>,
}

#[derive(Deserialize)]
struct MatchEntry {
    id: String,
    #[serde(default)]
    score: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    total_vector_count: u64,
}

/// Vector index backed by Pinecone's serverless REST API.
///
/// Construction is create-if-absent: the control plane is asked for the
/// index by name and a missing index is created with the fixed dimension
/// and cosine metric before the data-plane host is resolved. Upserts are
/// insert-or-replace keyed by id, so re-indexing the same collection never
/// duplicates entries.
pub struct PineconeVectorIndex {
    client: reqwest::Client,
    api_key: String,
    /// Data-plane base URL resolved from the index description.
    host_url: String,
}

impl PineconeVectorIndex {
    pub async fn new(
        api_key: impl Into<String>,
        index_name: &str,
    ) -> Result<Self, DomainError> {
        Self::with_control_plane(api_key, index_name, DEFAULT_CONTROL_PLANE_URL).await
    }

    /// Construct against an explicit control-plane URL. Production code uses
    /// [`PineconeVectorIndex::new`]; tests point this at a local server.
    pub async fn with_control_plane(
        api_key: impl Into<String>,
        index_name: &str,
        control_plane_url: &str,
    ) -> Result<Self, DomainError> {
        let api_key: String = api_key.into();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        let control_plane = control_plane_url.trim_end_matches('/');
        let describe_url = format!("{control_plane}/indexes/{index_name}");

        let response = client
            .get(&describe_url)
            .header("Api-Key", &api_key)
            .send()
            .await
            .map_err(|e| DomainError::index(format!("failed to reach Pinecone: {e}")))?;

        let description: IndexDescription = if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("Index {} not found, creating it", index_name);

            let request = CreateIndexRequest {
                name: index_name,
                dimension: DIMENSIONS,
                metric: METRIC,
                spec: IndexSpec {
                    serverless: ServerlessSpec {
                        cloud: CLOUD,
                        region: REGION,
                    },
                },
            };

            let create_response = client
                .post(format!("{control_plane}/indexes"))
                .header("Api-Key", &api_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| DomainError::index(format!("failed to create index: {e}")))?;

            if !create_response.status().is_success() {
                let status = create_response.status();
                let body = create_response.text().await.unwrap_or_default();
                warn!("PineconeVectorIndex: create index returned {status}: {body}");
                return Err(DomainError::index(format!(
                    "create index returned {status}"
                )));
            }

            create_response.json().await.map_err(|e| {
                DomainError::invalid_response(format!("index description did not parse: {e}"))
            })?
        } else if response.status().is_success() {
            response.json().await.map_err(|e| {
                DomainError::invalid_response(format!("index description did not parse: {e}"))
            })?
        } else {
            let status = response.status();
            return Err(DomainError::index(format!(
                "describe index returned {status}"
            )));
        };

        // The control plane reports a bare hostname; tests may hand back a
        // full URL, which is used as-is.
        let host_url = if description.host.starts_with("http") {
            description.host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", description.host)
        };

        debug!("Using Pinecone index {} at {}", index_name, host_url);

        Ok(Self {
            client,
            api_key,
            host_url,
        })
    }
}

#[async_trait]
impl VectorIndex for PineconeVectorIndex {
    async fn upsert(&self, embeddings: &[Embedding]) -> Result<(), DomainError> {
        if embeddings.is_empty() {
            return Ok(());
        }

        let request = UpsertRequest {
            vectors: embeddings
                .iter()
                .map(|e| VectorEntry {
                    id: e.document_id(),
                    values: e.vector(),
                })
                .collect(),
        };

        let response = self
            .client
            .post(format!("{}/vectors/upsert", self.host_url))
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::index(format!("upsert request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("PineconeVectorIndex: upsert returned {status}: {body}");
            return Err(DomainError::index(format!("upsert returned {status}")));
        }

        debug!("Upserted {} vectors", embeddings.len());
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, DomainError> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: false,
        };

        let response = self
            .client
            .post(format!("{}/query", self.host_url))
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::index(format!("query request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("PineconeVectorIndex: query returned {status}: {body}");
            return Err(DomainError::index(format!("query returned {status}")));
        }

        let query_response: QueryResponse = response.json().await.map_err(|e| {
            DomainError::invalid_response(format!("query response did not parse: {e}"))
        })?;

        Ok(query_response
            .matches
            .into_iter()
            .map(|m| VectorMatch::new(m.id, m.score))
            .collect())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let response = self
            .client
            .post(format!("{}/describe_index_stats", self.host_url))
            .header("Api-Key", &self.api_key)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| DomainError::index(format!("stats request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(DomainError::index(format!("stats returned {status}")));
        }

        let stats: StatsResponse = response.json().await.map_err(|e| {
            DomainError::invalid_response(format!("stats response did not parse: {e}"))
        })?;

        Ok(stats.total_vector_count)
    }
}
