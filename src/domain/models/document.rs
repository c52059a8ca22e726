use serde::{Deserialize, Serialize};

/// A text document to be indexed and retrieved.
///
/// The id is assigned once at ingestion and travels with the document
/// through embedding and storage. Retrieval returns ids, so a stored id
/// must always map back to the exact document that produced the vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Build a document collection from raw texts, assigning each its
    /// position in the list as a stable stringified id.
    pub fn from_texts<I, S>(texts: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(position, text)| Self::new(position.to_string(), text))
            .collect()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_texts_assigns_positional_ids() {
        let documents = Document::from_texts(["first", "second", "third"]);

        assert_eq!(documents.len(), 3);
        assert_eq!(documents[0].id(), "0");
        assert_eq!(documents[2].id(), "2");
        assert_eq!(documents[1].text(), "second");
    }
}
