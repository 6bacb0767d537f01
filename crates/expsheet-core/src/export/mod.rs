pub mod xlsx;

use std::path::Path;

use tracing::info;

use crate::error::ExpsheetError;
use crate::model::RecordSet;

/// File name the datasheet is saved under unless overridden.
pub const DEFAULT_FILE_NAME: &str = "데이터시트.xlsx";

pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Write `records` as an xlsx file at `path`.
///
/// The workbook is built in memory and written through a temporary file in
/// the target directory, so a failed export never leaves a partial file.
pub fn write_file(records: &RecordSet, path: &Path, sheet_name: &str) -> Result<(), ExpsheetError> {
    let bytes = xlsx::write_xlsx(records, sheet_name)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    std::io::Write::write_all(&mut tmp, &bytes)?;
    tmp.persist(path).map_err(|e| ExpsheetError::Io(e.error))?;

    info!(
        path = %path.display(),
        rows = records.len(),
        bytes = bytes.len(),
        "wrote spreadsheet"
    );
    Ok(())
}
