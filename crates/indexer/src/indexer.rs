use crate::error::{IndexerError, Result};
use crate::loader::{DocumentLoader, SourceDocument};
use crate::stats::IndexStats;
use semdex_embedder::EmbeddingProvider;
use semdex_vector_store::{EmbeddingStore, RecordId, VectorStoreError};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Index maintenance protocol: reconciles `(identity, text)` batches into
/// the embedding store.
///
/// Identities are processed strictly one at a time; each runs its
/// embed-then-upsert sequence to completion before the next begins. A
/// provider failure aborts only its own identity (nothing is written for
/// it) and the batch continues. Re-running over the same inputs is
/// idempotent.
pub struct DocumentIndexer {
    store: EmbeddingStore,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl DocumentIndexer {
    /// Fails fast when the provider's vector width disagrees with the
    /// store's fixed dimension.
    pub fn new(store: EmbeddingStore, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        if embedder.dimension() != store.dimension() {
            return Err(IndexerError::VectorStore(
                VectorStoreError::InvalidDimension {
                    expected: store.dimension(),
                    actual: embedder.dimension(),
                },
            ));
        }
        Ok(Self { store, embedder })
    }

    /// Load every document under `data_dir` and reconcile it into the
    /// store, persisting the store once the batch completes.
    pub async fn index_directory(&mut self, data_dir: impl AsRef<Path>) -> Result<IndexStats> {
        let documents = DocumentLoader::new(data_dir).load()?;
        let stats = self.index_documents(documents).await;
        self.store.save().await?;
        Ok(stats)
    }

    /// Reconcile a batch of documents, one identity at a time.
    pub async fn index_documents(&mut self, documents: Vec<SourceDocument>) -> IndexStats {
        let start = Instant::now();
        let mut stats = IndexStats::new();
        log::info!("Indexing {} documents", documents.len());

        for document in documents {
            match self.index_one(&document).await {
                Ok(_) => {
                    log::debug!("Indexed '{}'", document.identity);
                    stats.add_document(document.identity.as_str());
                }
                Err(err) => {
                    log::warn!("Failed to index '{}': {err}", document.identity);
                    stats.add_failure(document.identity.as_str(), &err);
                }
            }
        }

        stats.time_ms = start.elapsed().as_millis() as u64;
        log::info!(
            "Indexed {} documents ({} failed) in {}ms; store holds {} records",
            stats.documents(),
            stats.failures.len(),
            stats.time_ms,
            self.store.count()
        );
        stats
    }

    /// One identity's sequence: embed, then upsert into the store. The
    /// provider call happens before any store mutation, so a failed embed
    /// leaves no trace of the identity.
    async fn index_one(&mut self, document: &SourceDocument) -> Result<RecordId> {
        let vector = self.embedder.embed(&document.text).await?;
        Ok(self.store.upsert(&document.identity, vector)?)
    }

    #[must_use]
    pub fn store(&self) -> &EmbeddingStore {
        &self.store
    }

    /// Hand the store back to the caller at teardown.
    #[must_use]
    pub fn into_store(self) -> EmbeddingStore {
        self.store
    }
}
