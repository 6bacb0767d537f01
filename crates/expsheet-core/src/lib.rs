pub mod config;
pub mod error;
pub mod export;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod summarize;

use error::ExpsheetError;
use extraction::{combine_documents, DocumentSource, PdfExtractor};
use model::Datasheet;
use summarize::Summarizer;
use tracing::info;

/// Main API entry point: turn expense documents into a datasheet.
///
/// Reads every document, asks the summarizer for a Markdown table and parses
/// the first table in its reply. Any failure aborts the whole run; no partial
/// datasheet is returned.
pub fn generate_datasheet(
    sources: &[DocumentSource],
    extractor: &dyn PdfExtractor,
    summarizer: &dyn Summarizer,
) -> Result<Datasheet, ExpsheetError> {
    if sources.is_empty() {
        return Err(ExpsheetError::Config("no input documents given".into()));
    }

    let contents = combine_documents(sources, extractor)?;
    let document_chars = contents.chars().count();
    info!(
        documents = sources.len(),
        chars = document_chars,
        backend = summarizer.backend_name(),
        "summarizing documents"
    );

    let raw_response = summarizer.summarize(&contents)?;
    let records = parsing::parse_response(&raw_response)?;
    info!(
        columns = records.columns().len(),
        rows = records.len(),
        "datasheet ready"
    );

    Ok(Datasheet {
        records,
        raw_response,
        document_count: sources.len(),
        document_chars,
    })
}
