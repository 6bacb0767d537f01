use expsheet_core::extraction::pdftotext::PdftotextExtractor;
use expsheet_core::extraction::{combine_documents, truncate_content};
use std::path::PathBuf;

use super::{load_config, read_sources};

pub fn run(
    files: &[PathBuf],
    config: Option<PathBuf>,
    max_chars: Option<usize>,
) -> Result<(), expsheet_core::error::ExpsheetError> {
    let config = load_config(config.as_deref())?;
    let limit = max_chars.unwrap_or(config.summarizer.max_content_length);

    let sources = read_sources(files)?;
    let contents = combine_documents(&sources, &PdftotextExtractor::new())?;
    let text = truncate_content(&contents, limit);

    print!("{text}");
    let total = contents.chars().count();
    if total > limit {
        eprintln!("{} document(s), {total} characters, cut to {limit}", sources.len());
    } else {
        eprintln!("{} document(s), {total} characters", sources.len());
    }

    Ok(())
}
