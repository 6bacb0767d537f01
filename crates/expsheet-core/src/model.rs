use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// Parsed table: ordered column names and rows of text values aligned to them.
///
/// Values are never coerced. A blank cell is an empty string; a cell missing
/// from a short row is an absent value (`None`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    columns: Vec<String>,
    rows: Vec<Record>,
}

/// One data row. `values[i]` belongs to `RecordSet::columns()[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: Vec<Option<String>>,
}

impl Record {
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index)?.as_deref()
    }
}

impl RecordSet {
    pub fn new(columns: Vec<String>) -> Self {
        RecordSet {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding with absent values or cutting extra values so it
    /// lines up with the columns.
    pub fn push_row(&mut self, mut values: Vec<Option<String>>) {
        values.resize(self.columns.len(), None);
        self.rows.push(Record { values });
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of `column` in row `row`, if both exist and the cell is present.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Row `row` as (column name, value) pairs in column order.
    pub fn row_entries(&self, row: usize) -> Option<Vec<(&str, Option<&str>)>> {
        let record = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .enumerate()
                .map(|(i, c)| (c.as_str(), record.get(i)))
                .collect(),
        )
    }

    /// Render as a canonical Markdown table with literal pipes escaped.
    ///
    /// Trailing absent values are left off the row, so a parsed table renders
    /// back to one that parses equal. An absent value before a present one has
    /// no Markdown form and renders as an empty cell.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        push_markdown_line(&mut out, self.columns.iter().map(|c| c.as_str()));
        push_markdown_line(&mut out, self.columns.iter().map(|_| "---"));
        for record in &self.rows {
            let present = record
                .values
                .iter()
                .rposition(Option::is_some)
                .map_or(0, |last| last + 1);
            push_markdown_line(
                &mut out,
                record.values[..present]
                    .iter()
                    .map(|v| v.as_deref().unwrap_or("")),
            );
        }
        out
    }
}

fn push_markdown_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    out.push('|');
    for cell in cells {
        out.push(' ');
        out.push_str(&cell.replace('|', "\\|"));
        out.push_str(" |");
    }
    out.push('\n');
}

impl Serialize for RecordSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<RowRef<'_>> = self
            .rows
            .iter()
            .map(|record| RowRef {
                columns: &self.columns,
                record,
            })
            .collect();
        let mut s = serializer.serialize_struct("RecordSet", 2)?;
        s.serialize_field("columns", &self.columns)?;
        s.serialize_field("rows", &rows)?;
        s.end()
    }
}

/// Serializes a row as a JSON object keyed by column name, in column order.
struct RowRef<'a> {
    columns: &'a [String],
    record: &'a Record,
}

impl Serialize for RowRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (i, column) in self.columns.iter().enumerate() {
            map.serialize_entry(column, &self.record.get(i))?;
        }
        map.end()
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct Datasheet {
    pub records: RecordSet,
    /// Model response the records were parsed from.
    pub raw_response: String,
    pub document_count: usize,
    /// Characters of combined document text, before any truncation.
    pub document_chars: usize,
}
