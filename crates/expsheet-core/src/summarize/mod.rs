pub mod openai;
pub mod prompt;

use crate::error::ExpsheetError;

/// Trait for text-generation backends that turn document text into a
/// response containing a Markdown datasheet table.
pub trait Summarizer {
    /// Send the document text with the fixed instructions and return the
    /// model's reply verbatim.
    fn summarize(&self, document_text: &str) -> Result<String, ExpsheetError>;

    /// Name of this backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
