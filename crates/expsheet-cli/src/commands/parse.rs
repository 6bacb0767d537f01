use expsheet_core::error::ExpsheetError;
use expsheet_core::export;
use expsheet_core::parsing::parse_response;
use std::path::{Path, PathBuf};

use crate::output;

pub fn run(
    response_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
    sheet_name: &str,
) -> Result<(), ExpsheetError> {
    let response = read_response(&response_file)?;
    let records = parse_response(&response)?;

    match output_format {
        "json" => output::json::print(&records)?,
        _ => output::table::print(&records),
    }

    if let Some(path) = output_file {
        export::write_file(&records, &path, sheet_name)?;
        eprintln!("Wrote {} row(s) to {}", records.len(), path.display());
    }

    Ok(())
}

fn read_response(path: &Path) -> Result<String, ExpsheetError> {
    std::fs::read_to_string(path).map_err(|e| ExpsheetError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
