use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::application::{EmbeddingService, VectorIndex};
use crate::domain::{Document, DomainError};

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_secs(1);

/// Counts reported after an indexing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutcome {
    pub indexed: usize,
    pub skipped: usize,
}

pub struct IndexDocumentsUseCase {
    vector_index: Arc<dyn VectorIndex>,
    embedding_service: Arc<dyn EmbeddingService>,
    batch_size: usize,
    batch_delay: Duration,
}

impl IndexDocumentsUseCase {
    pub fn new(
        vector_index: Arc<dyn VectorIndex>,
        embedding_service: Arc<dyn EmbeddingService>,
    ) -> Self {
        Self {
            vector_index,
            embedding_service,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Pause inserted between batches. A crude client-side rate limit for
    /// the embedding endpoint, not driven by any server feedback signal.
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    /// Embed and upsert every document, in contiguous batches.
    ///
    /// A document whose embedding fails is skipped with a warning; its id is
    /// never reused, so failures cannot shift the ids of later successes.
    /// The inter-batch delay applies to every batch but the last, including
    /// batches where no embedding succeeded — the embedding endpoint was hit
    /// for those regardless.
    pub async fn execute(&self, documents: &[Document]) -> Result<IndexOutcome, DomainError> {
        info!(
            "Indexing {} documents in batches of {}",
            documents.len(),
            self.batch_size
        );

        let start_time = Instant::now();

        let progress_bar = ProgressBar::new(documents.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );

        let mut indexed = 0usize;
        let mut skipped = 0usize;

        let batch_count = documents.chunks(self.batch_size).count();

        for (batch_index, batch) in documents.chunks(self.batch_size).enumerate() {
            let mut embeddings = Vec::with_capacity(batch.len());

            for document in batch {
                progress_bar.set_message(document.id().to_string());

                match self.embedding_service.embed_document(document).await {
                    Ok(embedding) => embeddings.push(embedding),
                    Err(e) => {
                        warn!("Skipping document {} due to embedding error: {}", document.id(), e);
                        skipped += 1;
                    }
                }

                progress_bar.inc(1);
            }

            if embeddings.is_empty() {
                warn!("No embeddings generated for batch {}. Skipping upsert.", batch_index);
            } else {
                self.vector_index.upsert(&embeddings).await?;
                indexed += embeddings.len();
                debug!(
                    "Upserted {} embeddings for batch {}",
                    embeddings.len(),
                    batch_index
                );
            }

            let is_last_batch = batch_index + 1 == batch_count;
            if !is_last_batch && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        progress_bar.finish_with_message("done");

        let duration = start_time.elapsed();
        info!(
            "Indexing complete: {} indexed, {} skipped in {:.2}s",
            indexed,
            skipped,
            duration.as_secs_f64()
        );

        Ok(IndexOutcome { indexed, skipped })
    }
}
