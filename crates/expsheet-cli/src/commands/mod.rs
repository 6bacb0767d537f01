pub mod extract;
pub mod generate;
pub mod parse;

use expsheet_core::config::AppConfig;
use expsheet_core::error::ExpsheetError;
use expsheet_core::extraction::DocumentSource;
use std::path::{Path, PathBuf};

fn load_config(path: Option<&Path>) -> Result<AppConfig, ExpsheetError> {
    match path {
        Some(p) => AppConfig::load(p),
        None => Ok(AppConfig::default()),
    }
}

fn read_sources(files: &[PathBuf]) -> Result<Vec<DocumentSource>, ExpsheetError> {
    files
        .iter()
        .map(|p| DocumentSource::from_path(p))
        .collect()
}
