pub mod pdftotext;
pub mod spreadsheet;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::ExpsheetError;

/// Marker appended to document text cut at the length limit.
pub const TRUNCATION_MARKER: &str = "...";

/// Content extracted from a single page of a PDF.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub page_number: usize,
    pub lines: Vec<String>,
}

impl PageContent {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text content from PDF bytes, returning one PageContent per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, ExpsheetError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// An input document. The variant decides how its text is extracted.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    PlainText { name: String, bytes: Vec<u8> },
    Pdf { name: String, bytes: Vec<u8> },
    Spreadsheet { name: String, bytes: Vec<u8> },
}

impl DocumentSource {
    /// Read a file and classify it by extension.
    pub fn from_path(path: &Path) -> Result<Self, ExpsheetError> {
        let bytes = std::fs::read(path).map_err(|e| ExpsheetError::read(path, e))?;
        Self::from_bytes(path.to_string_lossy(), bytes)
    }

    /// Classify already-loaded bytes by the extension of `name`.
    ///
    /// `.pdf` is a PDF, `.xlsx`/`.xlsm` a spreadsheet, and text-like
    /// extensions (or none) plain text. Anything else is rejected.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ExpsheetError> {
        let name = name.into();
        let ext = Path::new(&name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());

        match ext.as_deref() {
            Some("pdf") => Ok(DocumentSource::Pdf { name, bytes }),
            Some("xlsx") | Some("xlsm") => Ok(DocumentSource::Spreadsheet { name, bytes }),
            None | Some("txt") | Some("text") | Some("md") | Some("csv") | Some("tsv") => {
                Ok(DocumentSource::PlainText { name, bytes })
            }
            Some(other) => Err(ExpsheetError::read(
                name.clone(),
                format!("unsupported file type '.{other}' (expected PDF, text or xlsx)"),
            )),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DocumentSource::PlainText { name, .. }
            | DocumentSource::Pdf { name, .. }
            | DocumentSource::Spreadsheet { name, .. } => name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DocumentSource::PlainText { .. } => "text",
            DocumentSource::Pdf { .. } => "pdf",
            DocumentSource::Spreadsheet { .. } => "xlsx",
        }
    }

    /// Extract the document's text. PDF pages are joined with newlines.
    pub fn extract_text(&self, pdf_extractor: &dyn PdfExtractor) -> Result<String, ExpsheetError> {
        match self {
            DocumentSource::PlainText { name, bytes } => String::from_utf8(bytes.clone())
                .map_err(|e| ExpsheetError::read(PathBuf::from(name), format!("not valid UTF-8 text: {e}"))),
            DocumentSource::Pdf { name, bytes } => {
                let pages = pdf_extractor.extract_pages(bytes)?;
                debug!(
                    name = name.as_str(),
                    pages = pages.len(),
                    backend = pdf_extractor.backend_name(),
                    "extracted PDF pages"
                );
                let text = pages
                    .iter()
                    .map(PageContent::text)
                    .collect::<Vec<_>>()
                    .join("\n");
                if text.trim().is_empty() {
                    warn!(name = name.as_str(), "no text found in PDF (scanned document?)");
                }
                Ok(text)
            }
            DocumentSource::Spreadsheet { name, bytes } => {
                spreadsheet::extract_workbook_text(bytes).map_err(|e| match e {
                    ExpsheetError::Extraction(reason) => ExpsheetError::read(PathBuf::from(name), reason),
                    other => other,
                })
            }
        }
    }
}

/// Concatenate the text of every document, each followed by a newline.
pub fn combine_documents(
    sources: &[DocumentSource],
    pdf_extractor: &dyn PdfExtractor,
) -> Result<String, ExpsheetError> {
    let mut contents = String::new();
    for source in sources {
        let text = source.extract_text(pdf_extractor)?;
        info!(
            name = source.name(),
            kind = source.kind(),
            chars = text.chars().count(),
            "read document"
        );
        contents.push_str(&text);
        contents.push('\n');
    }
    Ok(contents)
}

/// Cut `text` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_content(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            warn!(max_chars, "document text truncated");
            Cow::Owned(format!("{}{TRUNCATION_MARKER}", &text[..idx]))
        }
        None => Cow::Borrowed(text),
    }
}
