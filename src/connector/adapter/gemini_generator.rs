use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::application::AnswerGenerator;
use crate::domain::DomainError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const GENERATE_PATH: &str = "/v1beta2/models/gemini-pro:generateText";

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    prompt: ApiPrompt<'a>,
}

#[derive(serde::Serialize)]
struct ApiPrompt<'a> {
    text: &'a str,
}

/// Minimal subset of the generateText response we care about.
#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    output: String,
}

/// HTTP client for the Gemini text generation API.
///
/// The API may legally return zero candidates (e.g. when safety filters
/// block the prompt); that is surfaced as [`DomainError::InvalidResponse`]
/// rather than an index panic, so callers can branch on it.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    url: String,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        let url = format!("{}{GENERATE_PATH}", base.trim_end_matches('/'));
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            url,
        }
    }

    /// Construct from environment variables; `GEMINI_API_KEY` is required,
    /// `GEMINI_BASE_URL` optionally overrides the Google endpoint.
    pub fn from_env() -> Result<Self, DomainError> {
        let key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| DomainError::configuration("GEMINI_API_KEY is not set"))?;
        let base =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(key, base))
    }
}

#[async_trait]
impl AnswerGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        let request = ApiRequest {
            prompt: ApiPrompt { text: prompt },
        };

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::generation(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("GeminiGenerator: API returned {status}: {body}");
            return Err(DomainError::generation(format!("API returned {status}")));
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            DomainError::invalid_response(format!("generation response did not parse: {e}"))
        })?;

        api_response
            .candidates
            .into_iter()
            .next()
            .map(|c| c.output)
            .ok_or_else(|| {
                DomainError::invalid_response("generation response contained no candidates")
            })
    }
}
