mod text;
#[cfg(feature = "pdf")]
mod pdf;

pub use text::TextLoader;
#[cfg(feature = "pdf")]
pub use pdf::PdfLoader;

use std::path::Path;

use super::{DocumentError, DocumentLoader};

/// Pick a loader by file extension.
///
/// # Errors
///
/// Returns `DocumentError::UnsupportedFormat` when no loader handles the extension.
pub fn loader_for(path: &Path) -> Result<Box<dyn DocumentLoader>, DocumentError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let text = TextLoader::default();
    if text.supported_extensions().contains(&ext.as_str()) {
        return Ok(Box::new(text));
    }
    #[cfg(feature = "pdf")]
    {
        let pdf = PdfLoader::default();
        if pdf.supported_extensions().contains(&ext.as_str()) {
            return Ok(Box::new(pdf));
        }
    }
    Err(DocumentError::UnsupportedFormat(path.display().to_string()))
}
