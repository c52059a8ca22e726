use async_trait::async_trait;

use crate::domain::DomainError;

/// Produces an answer from a fully rendered prompt.
///
/// Implementations stay decoupled from transport and serialization details;
/// the use case owns the prompt template.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError>;
}
