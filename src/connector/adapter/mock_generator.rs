use async_trait::async_trait;

use crate::application::AnswerGenerator;
use crate::domain::DomainError;

/// Canned-answer generator for tests and `--mock` runs.
pub struct MockGenerator {
    answer: String,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            answer: "(mock) Please see the retrieved documents above.".to_string(),
        }
    }

    pub fn with_answer(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerGenerator for MockGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, DomainError> {
        Ok(self.answer.clone())
    }
}
