use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExpsheetError {
    #[error("failed to read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("could not find a table in the model response")]
    TableNotFound,

    #[error("malformed table: {0}")]
    MalformedTable(String),

    #[error("summarization request failed: {0}")]
    Transport(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("spreadsheet export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExpsheetError {
    pub(crate) fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ExpsheetError::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for ExpsheetError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ExpsheetError::Transport(format!("request timed out: {e}"))
        } else {
            ExpsheetError::Transport(e.to_string())
        }
    }
}
