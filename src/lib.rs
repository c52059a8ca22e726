pub mod application;
pub mod connector;
pub mod domain;

pub use application::{
    AnswerGenerator, AnswerQuestionUseCase, EmbeddingService, IndexDocumentsUseCase, IndexOutcome,
    RetrieveDocumentsUseCase, VectorIndex, DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE, DEFAULT_TOP_K,
};

pub use connector::{
    GeminiEmbedding, GeminiGenerator, InMemoryVectorIndex, MockEmbedding, MockGenerator,
    PineconeVectorIndex,
};

pub use domain::{Document, DomainError, Embedding, EmbeddingConfig, VectorMatch};
