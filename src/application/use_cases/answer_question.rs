use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::AnswerGenerator;
use crate::domain::{Document, DomainError};

pub struct AnswerQuestionUseCase {
    generator: Arc<dyn AnswerGenerator>,
}

impl AnswerQuestionUseCase {
    pub fn new(generator: Arc<dyn AnswerGenerator>) -> Self {
        Self { generator }
    }

    /// Join retrieved documents into a context block, in rank order.
    /// Ids that don't resolve against the collection are skipped with a
    /// warning rather than aborting the answer.
    pub fn build_context(documents: &[Document], retrieved_ids: &[String]) -> String {
        retrieved_ids
            .iter()
            .filter_map(|id| {
                let found = documents.iter().find(|d| d.id() == id.as_str());
                if found.is_none() {
                    warn!("Retrieved id {} does not match any known document", id);
                }
                found.map(Document::text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub async fn execute(&self, query: &str, context: &str) -> Result<String, DomainError> {
        let prompt = format!("Context: {context}\n\nQuestion: {query}\nAnswer:");
        debug!("Generation prompt is {} characters", prompt.len());

        let answer = self.generator.generate(&prompt).await?;
        info!("Generated answer ({} characters)", answer.len());
        Ok(answer)
    }
}
