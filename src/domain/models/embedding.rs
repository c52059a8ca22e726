use serde::{Deserialize, Serialize};

/// Represents a vector embedding for a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub document_id: String,
    pub vector: Vec<f32>,
    pub model: String,
}

impl Embedding {
    pub fn new(document_id: String, vector: Vec<f32>, model: String) -> Self {
        Self {
            document_id,
            vector,
            model,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

/// Configuration for the embedding model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model_name: String,
    pub dimensions: usize,
}

impl EmbeddingConfig {
    pub fn new(model_name: String, dimensions: usize) -> Self {
        Self {
            model_name,
            dimensions,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_name: "embedding-gecko-001".to_string(),
            dimensions: 768,
        }
    }
}
