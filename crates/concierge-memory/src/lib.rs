//! Heading-aware document ingestion and persistent vector storage.

pub mod document;
pub mod in_memory_store;
pub mod qdrant_store;
pub mod vector_store;

pub use in_memory_store::InMemoryVectorStore;
pub use qdrant_store::QdrantStore;
pub use vector_store::{ScoredVectorPoint, VectorPoint, VectorStore, VectorStoreError};
