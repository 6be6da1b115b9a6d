use std::path::Path;
use std::sync::Arc;

use concierge_llm::LlmProvider;

use super::{Chunk, Document, DocumentError, HeadingChunker, loader_for};
use crate::vector_store::{VectorPoint, VectorStore};

const DEFAULT_BATCH_SIZE: usize = 64;

/// Counts produced by one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
}

/// Chunk, embed and store documents in one collection.
pub struct IngestionPipeline<P: LlmProvider> {
    provider: Arc<P>,
    store: Arc<dyn VectorStore>,
    collection: String,
    batch_size: usize,
    recreate: bool,
}

impl<P: LlmProvider> IngestionPipeline<P> {
    pub fn new(provider: Arc<P>, store: Arc<dyn VectorStore>, collection: impl Into<String>) -> Self {
        Self {
            provider,
            store,
            collection: collection.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            recreate: false,
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Drop the collection before writing instead of adding to it.
    #[must_use]
    pub fn with_recreate(mut self, recreate: bool) -> Self {
        self.recreate = recreate;
        self
    }

    /// Ingest documents in order with a single chunker, so heading context and ids
    /// run on across document boundaries.
    ///
    /// Without recreate, ids continue after the points already in the collection,
    /// so earlier runs are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding or storage fails. Batches already written stay written.
    pub async fn ingest(&self, documents: &[Document]) -> Result<IngestReport, DocumentError> {
        let exists = self.store.collection_exists(&self.collection).await?;
        if self.recreate && exists {
            tracing::info!(collection = %self.collection, "recreating collection");
            self.store.delete_collection(&self.collection).await?;
        }
        let first_id = if exists && !self.recreate {
            self.store.count(&self.collection).await?
        } else {
            0
        };

        let mut chunker = HeadingChunker::starting_at(first_id);
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|doc| {
                let chunks = chunker.chunk_document(doc);
                tracing::debug!(source = %doc.metadata.source, chunks = chunks.len(), "chunked document");
                chunks
            })
            .collect();

        let mut collection_ready = false;
        for batch in chunks.chunks(self.batch_size) {
            let mut points = Vec::with_capacity(batch.len());
            for chunk in batch {
                let vector = self.provider.embed(&chunk.text).await?;
                points.push(VectorPoint {
                    id: chunk.id,
                    vector,
                    payload: chunk.payload(),
                });
            }

            if !collection_ready && let Some(first) = points.first() {
                self.store
                    .ensure_collection(&self.collection, first.vector.len() as u64)
                    .await?;
                collection_ready = true;
            }

            self.store.upsert(&self.collection, points).await?;
            tracing::debug!(collection = %self.collection, stored = batch.len(), "upserted batch");
        }

        let report = IngestReport {
            documents: documents.len(),
            chunks: chunks.len(),
        };
        tracing::info!(
            collection = %self.collection,
            documents = report.documents,
            chunks = report.chunks,
            "ingestion complete"
        );
        Ok(report)
    }

    /// Load every path with the loader matching its extension, then ingest them as one run.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be loaded, or if embedding or storage fails.
    pub async fn load_and_ingest(&self, paths: &[impl AsRef<Path>]) -> Result<IngestReport, DocumentError> {
        let mut documents = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let loader = loader_for(path)?;
            documents.extend(loader.load(path).await?);
        }
        self.ingest(&documents).await
    }
}
