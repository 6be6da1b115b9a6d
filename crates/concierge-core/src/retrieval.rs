//! Query-time lookup of the chunks most similar to a question.

use std::collections::HashMap;
use std::sync::Arc;

use concierge_llm::LlmProvider;
use concierge_memory::document::{DOCUMENT_KEY, HEADING_KEY, SUBHEADING_KEY};
use concierge_memory::{ScoredVectorPoint, VectorStore};

use crate::error::RetrievalError;

pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub heading: String,
    pub subheading: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub document: String,
    pub metadata: ChunkMetadata,
    pub score: f32,
}

/// Hits in index order: most similar first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalResult {
    pub hits: Vec<RetrievedChunk>,
}

impl RetrievalResult {
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RetrievedChunk> {
        self.hits.iter()
    }

    /// One heading per hit, duplicates kept.
    #[must_use]
    pub fn headings(&self) -> Vec<String> {
        self.hits.iter().map(|h| h.metadata.heading.clone()).collect()
    }
}

pub struct Retriever<P: LlmProvider> {
    provider: Arc<P>,
    store: Arc<dyn VectorStore>,
    collection: String,
}

impl<P: LlmProvider> Retriever<P> {
    pub fn new(provider: Arc<P>, store: Arc<dyn VectorStore>, collection: impl Into<String>) -> Self {
        Self {
            provider,
            store,
            collection: collection.into(),
        }
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Embed `query` once and return up to `top_k` nearest chunks.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Embedding`] if the embedding call fails,
    /// [`RetrievalError::IndexUnavailable`] if the index query fails, and
    /// [`RetrievalError::MalformedPayload`] if a stored point lacks its text or headings.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievalResult, RetrievalError> {
        let embedding = self
            .provider
            .embed(query)
            .await
            .map_err(RetrievalError::Embedding)?;

        let points = self
            .store
            .search(&self.collection, embedding, top_k as u64)
            .await
            .map_err(RetrievalError::IndexUnavailable)?;

        let hits = points
            .into_iter()
            .map(into_chunk)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            collection = %self.collection,
            top_k,
            hits = hits.len(),
            "retrieved chunks"
        );
        Ok(RetrievalResult { hits })
    }
}

fn into_chunk(point: ScoredVectorPoint) -> Result<RetrievedChunk, RetrievalError> {
    let field = |payload: &HashMap<String, serde_json::Value>, key: &'static str| {
        payload
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
            .ok_or(RetrievalError::MalformedPayload {
                id: point.id,
                field: key,
            })
    };

    Ok(RetrievedChunk {
        document: field(&point.payload, DOCUMENT_KEY)?,
        metadata: ChunkMetadata {
            heading: field(&point.payload, HEADING_KEY)?,
            subheading: field(&point.payload, SUBHEADING_KEY)?,
        },
        score: point.score,
    })
}
