use crate::error::ExtractionError;
use lopdf::Document;
use tracing::debug;

pub trait PdfExtractor: Send + Sync {
    /// All page texts of the document, in page order, as one string.
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let document =
            Document::load_mem(bytes).map_err(|error| ExtractionError::PdfParse(error.to_string()))?;

        let pages = document.get_pages().into_keys().map(|page_no| {
            // An undecodable page contributes nothing, like a blank one.
            document.extract_text(&[page_no]).unwrap_or_else(|error| {
                debug!(page = page_no, %error, "page has no extractable text");
                String::new()
            })
        });

        Ok(join_pages(pages))
    }
}

/// Appends every non-empty page behind a newline. Whitespace-only pages
/// are kept as extracted.
fn join_pages(pages: impl IntoIterator<Item = String>) -> String {
    let mut full_text = String::new();
    for text in pages {
        if !text.is_empty() {
            full_text.push('\n');
            full_text.push_str(&text);
        }
    }
    full_text
}
