use expsheet_core::error::ExpsheetError;
use expsheet_core::export::{self, xlsx::validate_sheet_name};
use expsheet_core::extraction::pdftotext::PdftotextExtractor;
use expsheet_core::summarize::openai::OpenAiSummarizer;
use expsheet_core::summarize::Summarizer;
use std::path::{Path, PathBuf};

use super::{load_config, read_sources};
use crate::output;

pub struct GenerateArgs {
    pub files: Vec<PathBuf>,
    pub out: Option<PathBuf>,
    pub output_format: String,
    pub config: Option<PathBuf>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_chars: Option<usize>,
    pub save_response: Option<PathBuf>,
}

/// Writes every model reply to a file before handing it on, so the reply
/// survives a failed parse.
struct SavingSummarizer<'a> {
    inner: &'a dyn Summarizer,
    path: &'a Path,
}

impl Summarizer for SavingSummarizer<'_> {
    fn summarize(&self, document_text: &str) -> Result<String, ExpsheetError> {
        let reply = self.inner.summarize(document_text)?;
        std::fs::write(self.path, &reply)?;
        eprintln!("Model response saved to {}", self.path.display());
        Ok(reply)
    }

    fn backend_name(&self) -> &str {
        self.inner.backend_name()
    }
}

pub fn run(args: GenerateArgs) -> Result<(), ExpsheetError> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(key) = args.api_key {
        config.summarizer.api_key = key;
    }
    if let Some(model) = args.model {
        config.summarizer.model = model;
    }
    if let Some(base_url) = args.base_url {
        config.summarizer.base_url = base_url;
    }
    if let Some(max_chars) = args.max_chars {
        config.summarizer.max_content_length = max_chars;
    }

    // Fail on bad settings before spending an API call.
    validate_sheet_name(&config.export.sheet_name)?;
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(&config.export.file_name));

    let sources = read_sources(&args.files)?;
    let extractor = PdftotextExtractor::new();
    let client = OpenAiSummarizer::new(config.summarizer)?;

    let sheet = match args.save_response.as_deref() {
        Some(path) => {
            let saving = SavingSummarizer {
                inner: &client,
                path,
            };
            expsheet_core::generate_datasheet(&sources, &extractor, &saving)?
        }
        None => expsheet_core::generate_datasheet(&sources, &extractor, &client)?,
    };

    export::write_file(&sheet.records, &out, &config.export.sheet_name)?;

    match args.output_format.as_str() {
        "json" => output::json::print(&sheet.records)?,
        _ => output::table::print(&sheet.records),
    }
    eprintln!(
        "Wrote {} row(s) from {} document(s) to {}",
        sheet.records.len(),
        sheet.document_count,
        out.display()
    );

    Ok(())
}
