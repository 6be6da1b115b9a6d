use std::collections::HashMap;

/// Payload key holding the section heading in force when a chunk was produced.
pub const HEADING_KEY: &str = "heading";
/// Payload key holding the subsection heading.
pub const SUBHEADING_KEY: &str = "subheading";
/// Payload key holding the chunk text itself.
pub const DOCUMENT_KEY: &str = "document";

#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    pub source: String,
    pub content_type: String,
}

/// Plain text extracted from one source file.
#[derive(Debug, Clone)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    #[must_use]
    pub fn from_text(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: DocumentMetadata {
                source: source.into(),
                content_type: "text/plain".to_owned(),
            },
        }
    }
}

/// One body line tagged with the heading context it appeared under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: u64,
    pub heading: String,
    pub subheading: String,
    pub text: String,
}

impl Chunk {
    #[must_use]
    pub fn payload(&self) -> HashMap<String, serde_json::Value> {
        HashMap::from([
            (HEADING_KEY.to_owned(), self.heading.clone().into()),
            (SUBHEADING_KEY.to_owned(), self.subheading.clone().into()),
            (DOCUMENT_KEY.to_owned(), self.text.clone().into()),
        ])
    }
}
