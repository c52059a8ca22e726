use serde::{Deserialize, Serialize};

/// One ranked hit from a similarity query against the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMatch {
    id: String,
    score: f32,
}

impl VectorMatch {
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn into_id(self) -> String {
        self.id
    }
}
