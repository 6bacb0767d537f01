use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::error::ExpsheetError;

/// Flatten every sheet of an xlsx workbook into text.
///
/// Non-empty cells in a row are joined with a space and rows with a newline,
/// which is enough for the model to read ledger-style sheets.
pub fn extract_workbook_text(bytes: &[u8]) -> Result<String, ExpsheetError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
        .map_err(|e| ExpsheetError::Extraction(format!("failed to open xlsx: {e}")))?;

    let mut lines = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ExpsheetError::Extraction(format!("sheet '{sheet_name}': {e}")))?;

        for row in range.rows() {
            let cells: Vec<String> = row.iter().filter_map(cell_as_string).collect();
            if !cells.is_empty() {
                lines.push(cells.join(" "));
            }
        }
    }

    Ok(lines.join("\n"))
}

fn cell_as_string(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Empty => None,
        _ => Some(format!("{cell}")),
    }
}
