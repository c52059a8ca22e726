use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use qabot::{
    AnswerGenerator, AnswerQuestionUseCase, Document, DomainError, EmbeddingService,
    GeminiEmbedding, GeminiGenerator, InMemoryVectorIndex, IndexDocumentsUseCase, MockEmbedding,
    MockGenerator, PineconeVectorIndex, RetrieveDocumentsUseCase, VectorIndex,
};

const INDEX_NAME: &str = "rag-qa-bot";
const DEFAULT_QUESTION: &str = "How can I get a refund?";

/// Built-in FAQ corpus. Document ids are the list positions, assigned once
/// at ingestion.
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

#[derive(Parser)]
#[command(name = "qabot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use the deterministic mock embedding, generator, and in-memory index
    /// instead of the remote services. Runs fully offline.
    #[arg(long, global = true)]
    mock: bool,

    #[arg(long, global = true, default_value = INDEX_NAME)]
    index_name: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the FAQ corpus, retrieve context for a question, and answer it.
    Ask {
        question: Option<String>,

        #[arg(long, default_value = "5")]
        batch_size: usize,

        /// Pause between embedding batches, in milliseconds.
        #[arg(long, default_value = "1000")]
        batch_delay_ms: u64,

        #[arg(short, long, default_value = "3")]
        top_k: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let (embedding_service, vector_index, generator) = build_services(&cli).await?;

    match cli.command {
        Commands::Ask {
            question,
            batch_size,
            batch_delay_ms,
            top_k,
        } => {
            let question = question.unwrap_or_else(|| DEFAULT_QUESTION.to_string());
            let documents = Document::from_texts(FAQ_DOCUMENTS);

            let indexer =
                IndexDocumentsUseCase::new(vector_index.clone(), embedding_service.clone())
                    .with_batch_size(batch_size)
                    .with_batch_delay(Duration::from_millis(batch_delay_ms));
            let outcome = indexer.execute(&documents).await?;
            info!(
                "Indexed {} documents ({} skipped)",
                outcome.indexed, outcome.skipped
            );

            let retriever = RetrieveDocumentsUseCase::new(vector_index, embedding_service)
                .with_top_k(top_k);
            let retrieved_ids = retriever.execute(&question).await?;

            if retrieved_ids.is_empty() {
                println!("Could not retrieve relevant documents.");
                return Ok(());
            }

            let context = AnswerQuestionUseCase::build_context(&documents, &retrieved_ids);
            let answerer = AnswerQuestionUseCase::new(generator);
            let answer = answerer.execute(&question, &context).await?;

            println!("Q: {question}\nA: {answer}");
        }
    }

    Ok(())
}

async fn build_services(
    cli: &Cli,
) -> Result<(
    Arc<dyn EmbeddingService>,
    Arc<dyn VectorIndex>,
    Arc<dyn AnswerGenerator>,
)> {
    if cli.mock {
        info!("Using mock embedding, generator, and in-memory vector index");
        return Ok((
            Arc::new(MockEmbedding::new()),
            Arc::new(InMemoryVectorIndex::new()),
            Arc::new(MockGenerator::new()),
        ));
    }

    // Fail on missing credentials here, at startup, rather than letting the
    // first remote call surface an auth error mid-pipeline.
    let embedding_service = GeminiEmbedding::from_env()?;
    let generator = GeminiGenerator::from_env()?;
    let pinecone_key = std::env::var("PINECONE_API_KEY")
        .map_err(|_| DomainError::configuration("PINECONE_API_KEY is not set"))?;

    let vector_index = PineconeVectorIndex::new(pinecone_key, &cli.index_name).await?;
    info!("Connected to Pinecone index {}", cli.index_name);

    Ok((
        Arc::new(embedding_service),
        Arc::new(vector_index),
        Arc::new(generator),
    ))
}
