use tracing::{debug, warn};

use crate::error::ExpsheetError;
use crate::model::RecordSet;
use crate::parsing::block::is_separator_line;

/// Parse a Markdown table block into a `RecordSet`.
///
/// The first non-separator line is the header. Columns with a blank name and
/// repeated names are dropped; data cells stay aligned to their original
/// header position. A header with no data rows gives an empty `RecordSet`.
pub fn parse_table(block: &str) -> Result<RecordSet, ExpsheetError> {
    let mut lines = block
        .lines()
        .filter(|l| !l.trim().is_empty() && !is_separator_line(l));

    let header_line = lines
        .next()
        .ok_or_else(|| ExpsheetError::MalformedTable("table has no header row".into()))?;
    let header = split_cells(header_line);

    // (position in the header row, column name)
    let mut kept: Vec<(usize, String)> = Vec::new();
    for (idx, raw) in header.iter().enumerate() {
        let name = raw.trim();
        if name.is_empty() {
            warn!(column = idx + 1, "dropping column with blank header");
            continue;
        }
        if kept.iter().any(|(_, n)| n == name) {
            warn!(column = idx + 1, name, "dropping duplicate column");
            continue;
        }
        kept.push((idx, name.to_string()));
    }

    if kept.is_empty() {
        return Err(ExpsheetError::MalformedTable(format!(
            "no named columns in header row '{}'",
            header_line.trim()
        )));
    }

    let mut records = RecordSet::new(kept.iter().map(|(_, name)| name.clone()).collect());

    for (row_idx, line) in lines.enumerate() {
        let cells = split_cells(line);
        if cells.len() != header.len() {
            debug!(
                row = row_idx + 1,
                cells = cells.len(),
                expected = header.len(),
                "row width differs from header"
            );
        }
        // A blank cell is an empty string; only cells past the end of a short
        // row are absent.
        let values = kept
            .iter()
            .map(|(idx, _)| cells.get(*idx).map(|c| c.trim().to_string()))
            .collect();
        records.push_row(values);
    }

    debug!(
        columns = records.columns().len(),
        rows = records.len(),
        "parsed table"
    );
    Ok(records)
}

/// Split a table line into raw (untrimmed) cells.
///
/// One leading and one trailing pipe are row borders, not separators, so
/// `| a | b |` gives two cells. `\|` is a literal pipe inside a cell.
pub fn split_cells(line: &str) -> Vec<String> {
    let mut rest = line.trim();
    rest = rest.strip_prefix('|').unwrap_or(rest);
    if rest.ends_with('|') && !rest.ends_with("\\|") {
        rest = &rest[..rest.len() - 1];
    }

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells
}
