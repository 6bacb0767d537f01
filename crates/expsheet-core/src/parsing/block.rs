use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::ExpsheetError;

/// A row with a pipe at both ends, e.g. `| a | b |`.
static BORDERED_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\|.*\|\s*$").expect("valid bordered row pattern"));

/// The run of consecutive lines in a model response that forms a Markdown table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBlock<'a> {
    /// Exact text of the table lines, including the last line's newline.
    pub text: &'a str,
    /// Byte offset of `text` within the searched string.
    pub start: usize,
    pub line_count: usize,
    pub bordered: bool,
}

impl TableBlock<'_> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Detect if a line is a bordered table row.
pub fn is_bordered_row(line: &str) -> bool {
    BORDERED_ROW.is_match(line)
}

/// Detect a header/body separator such as `|---|:---:|` or `--- | ---`.
///
/// Only pipes, dashes, colons and whitespace are allowed and at least one
/// dash is required. Dash run-lengths may differ per column.
pub fn is_separator_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| c == '|' || c == '-' || c == ':' || c.is_whitespace())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Bordered,
    Borderless,
}

impl Layout {
    /// Which layout, if any, starts a table at `line` given the line after it.
    fn detect(line: &str, next: &str) -> Option<Layout> {
        if is_bordered_row(line) && is_bordered_row(next) {
            Some(Layout::Bordered)
        } else if has_cells(line) && is_separator_line(next) && next.contains('|') {
            Some(Layout::Borderless)
        } else {
            None
        }
    }

    /// Once a table has started, any line with a pipe belongs to it. Rows that
    /// lost their closing pipe are common in model output.
    fn continues(self, line: &str) -> bool {
        has_cells(line)
    }
}

fn has_cells(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.contains('|')
}

fn strip_newline(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Find the first Markdown table in `text`.
///
/// A table starts at the first line that is followed by another table line
/// and runs until the first line without a pipe. Later tables are ignored.
pub fn find_table_block(text: &str) -> Result<TableBlock<'_>, ExpsheetError> {
    let mut lines: Vec<(usize, &str)> = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        lines.push((offset, line));
        offset += line.len();
    }

    for (i, window) in lines.windows(2).enumerate() {
        let Some(layout) = Layout::detect(strip_newline(window[0].1), strip_newline(window[1].1))
        else {
            continue;
        };

        let mut last = i + 1;
        while let Some(&(_, next)) = lines.get(last + 1) {
            if !layout.continues(strip_newline(next)) {
                break;
            }
            last += 1;
        }

        let start = lines[i].0;
        let end = lines[last].0 + lines[last].1.len();
        let line_count = last - i + 1;
        debug!(
            line = i + 1,
            line_count,
            ?layout,
            "found table block"
        );
        return Ok(TableBlock {
            text: &text[start..end],
            start,
            line_count,
            bordered: layout == Layout::Bordered,
        });
    }

    Err(ExpsheetError::TableNotFound)
}
