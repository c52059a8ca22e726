//! End-to-end tests for the indexing, retrieval, and answering pipeline.
//!
//! These run against the deterministic mock embedding and the in-memory
//! vector index, so no network is involved.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use qabot::{
    AnswerGenerator, AnswerQuestionUseCase, Document, DomainError, InMemoryVectorIndex,
    IndexDocumentsUseCase, MockEmbedding, MockGenerator, RetrieveDocumentsUseCase, VectorIndex,
};

const FAQ_DOCUMENTS: [&str; 15] = [
    "What is the refund policy?",
    "How can I contact customer support?",
    "What are the business hours?",
    "How to track my order?",
    "Do you offer international shipping?",
    "What payment methods do you accept?",
    "How do I create an account?",
    "What is your return address?",
    "Are there any discounts available?",
    "How do I reset my password?",
    "What is your warranty policy?",
    "Do you have a mobile app?",
    "How can I unsubscribe from emails?",
    "What are your terms of service?",
    "How do I delete my account?",
];

struct TestEnv {
    index: Arc<InMemoryVectorIndex>,
    embedding: Arc<MockEmbedding>,
    documents: Vec<Document>,
}

fn setup(embedding: MockEmbedding) -> TestEnv {
    TestEnv {
        index: Arc::new(InMemoryVectorIndex::new()),
        embedding: Arc::new(embedding),
        documents: Document::from_texts(FAQ_DOCUMENTS),
    }
}

async fn index_all(env: &TestEnv) -> qabot::IndexOutcome {
    IndexDocumentsUseCase::new(env.index.clone(), env.embedding.clone())
        .with_batch_size(5)
        .with_batch_delay(Duration::ZERO)
        .execute(&env.documents)
        .await
        .expect("indexing should succeed")
}

#[tokio::test]
async fn all_successful_embeddings_index_every_document() {
    let env = setup(MockEmbedding::new());

    let outcome = index_all(&env).await;

    assert_eq!(outcome.indexed, FAQ_DOCUMENTS.len());
    assert_eq!(outcome.skipped, 0);
    assert_eq!(env.index.count().await.unwrap(), FAQ_DOCUMENTS.len() as u64);
}

#[tokio::test]
async fn stored_ids_are_original_list_positions() {
    let env = setup(MockEmbedding::new());
    index_all(&env).await;

    let retriever = RetrieveDocumentsUseCase::new(env.index.clone(), env.embedding.clone());
    let ids = retriever
        .execute("What is your warranty policy?")
        .await
        .unwrap();

    assert_eq!(ids.first().map(String::as_str), Some("10"));
}

#[tokio::test]
async fn failed_embedding_does_not_shift_later_ids() {
    // Document 1 ("How can I contact customer support?") fails; documents 2+
    // in the same batch and every later batch must keep their own ids.
    let env = setup(MockEmbedding::failing_on("customer support"));

    let outcome = index_all(&env).await;

    assert_eq!(outcome.indexed, FAQ_DOCUMENTS.len() - 1);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(
        env.index.count().await.unwrap(),
        (FAQ_DOCUMENTS.len() - 1) as u64
    );

    let retriever = RetrieveDocumentsUseCase::new(env.index.clone(), env.embedding.clone());

    // Same batch, after the failure.
    let ids = retriever
        .execute("What are the business hours?")
        .await
        .unwrap();
    assert_eq!(ids.first().map(String::as_str), Some("2"));

    // Later batch.
    let ids = retriever
        .execute("What payment methods do you accept?")
        .await
        .unwrap();
    assert_eq!(ids.first().map(String::as_str), Some("5"));
}

#[tokio::test]
async fn failed_query_embedding_returns_empty_not_error() {
    let env = setup(MockEmbedding::failing_on("refund"));
    // Index succeeds for every document except the refund one.
    index_all(&env).await;

    let retriever = RetrieveDocumentsUseCase::new(env.index.clone(), env.embedding.clone());
    let ids = retriever.execute("How can I get a refund?").await.unwrap();

    assert!(ids.is_empty());
}

#[tokio::test]
async fn retriever_returns_at_most_top_k_ids() {
    let env = setup(MockEmbedding::new());
    index_all(&env).await;

    let retriever = RetrieveDocumentsUseCase::new(env.index.clone(), env.embedding.clone());
    let ids = retriever.execute("How do I manage my account?").await.unwrap();

    assert!(ids.len() <= 3);
    assert!(!ids.is_empty());
}

#[tokio::test]
async fn refund_question_retrieves_refund_policy_document() {
    let env = setup(MockEmbedding::new());
    index_all(&env).await;

    let retriever = RetrieveDocumentsUseCase::new(env.index.clone(), env.embedding.clone());
    let ids = retriever.execute("How can I get a refund?").await.unwrap();

    let retrieved_texts: Vec<&str> = ids
        .iter()
        .filter_map(|id| env.documents.iter().find(|d| d.id() == id.as_str()))
        .map(Document::text)
        .collect();

    assert!(
        retrieved_texts.contains(&"What is the refund policy?"),
        "top-3 should include the refund policy document, got {retrieved_texts:?}"
    );
}

#[tokio::test]
async fn reindexing_produces_no_duplicate_entries() {
    let env = setup(MockEmbedding::new());

    index_all(&env).await;
    index_all(&env).await;

    assert_eq!(env.index.count().await.unwrap(), FAQ_DOCUMENTS.len() as u64);
}

#[tokio::test]
async fn full_pipeline_answers_from_retrieved_context() {
    let env = setup(MockEmbedding::new());
    index_all(&env).await;

    let retriever = RetrieveDocumentsUseCase::new(env.index.clone(), env.embedding.clone());
    let ids = retriever.execute("How can I get a refund?").await.unwrap();
    assert!(!ids.is_empty());

    let context = AnswerQuestionUseCase::build_context(&env.documents, &ids);
    assert!(context.contains("refund"));

    let answerer = AnswerQuestionUseCase::new(Arc::new(MockGenerator::with_answer(
        "Refunds are issued within 30 days.",
    )));
    let answer = answerer
        .execute("How can I get a refund?", &context)
        .await
        .unwrap();

    assert_eq!(answer, "Refunds are issued within 30 days.");
}

/// Generator that always reports a malformed upstream response.
struct NoCandidatesGenerator;

#[async_trait]
impl AnswerGenerator for NoCandidatesGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, DomainError> {
        Err(DomainError::invalid_response(
            "generation response contained no candidates",
        ))
    }
}

#[tokio::test]
async fn answerer_surfaces_empty_generation_as_typed_error() {
    let answerer = AnswerQuestionUseCase::new(Arc::new(NoCandidatesGenerator));

    let err = answerer
        .execute("How can I get a refund?", "What is the refund policy?")
        .await
        .unwrap_err();

    assert!(err.is_invalid_response());
}

#[tokio::test]
async fn empty_document_list_indexes_nothing() {
    let index: Arc<InMemoryVectorIndex> = Arc::new(InMemoryVectorIndex::new());
    let embedding: Arc<MockEmbedding> = Arc::new(MockEmbedding::new());

    let outcome = IndexDocumentsUseCase::new(index.clone(), embedding)
        .with_batch_delay(Duration::ZERO)
        .execute(&[])
        .await
        .unwrap();

    assert_eq!(outcome.indexed, 0);
    assert_eq!(outcome.skipped, 0);
    assert_eq!(index.count().await.unwrap(), 0);
}
