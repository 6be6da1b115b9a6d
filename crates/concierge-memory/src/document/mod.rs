pub mod chunker;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod types;

pub use chunker::{DEFAULT_HEADING, DEFAULT_SUBHEADING, HeadingChunker};
pub use error::DocumentError;
pub use loader::{TextLoader, loader_for};
pub use pipeline::{IngestReport, IngestionPipeline};
pub use types::{Chunk, DOCUMENT_KEY, Document, DocumentMetadata, HEADING_KEY, SUBHEADING_KEY};

#[cfg(feature = "pdf")]
pub use loader::PdfLoader;

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Turns a source file into plain-text documents.
pub trait DocumentLoader: Send + Sync {
    fn load(
        &self,
        path: &std::path::Path,
    ) -> crate::vector_store::BoxFuture<'_, Result<Vec<Document>, DocumentError>>;

    fn supported_extensions(&self) -> &[&str];
}
