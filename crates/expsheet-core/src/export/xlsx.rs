use std::fmt::Display;
use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ExpsheetError;
use crate::model::RecordSet;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

/// Two cell formats: 0 is the default, 1 is the bold header.
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

const HEADER_STYLE: &str = "1";

/// Serialize a `RecordSet` as a single-sheet xlsx workbook held in memory.
///
/// Row 1 holds the column names; each record follows in order. Every cell is
/// written as an inline string; absent and empty values leave the cell empty.
pub fn write_xlsx(records: &RecordSet, sheet_name: &str) -> Result<Vec<u8>, ExpsheetError> {
    validate_sheet_name(sheet_name)?;

    let workbook = workbook_xml(sheet_name)?;
    let sheet = sheet_xml(records)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    // Fixed timestamp keeps the output byte-for-byte reproducible.
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());
    let parts: [(&str, &[u8]); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", ROOT_RELS.as_bytes()),
        ("xl/workbook.xml", workbook.as_slice()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
        ("xl/styles.xml", STYLES.as_bytes()),
        ("xl/worksheets/sheet1.xml", sheet.as_slice()),
    ];
    for (name, data) in parts {
        zip.start_file(name, options).map_err(export_error)?;
        zip.write_all(data)?;
    }
    let cursor = zip.finish().map_err(export_error)?;
    Ok(cursor.into_inner())
}

/// Excel limits sheet names to 31 characters and forbids a few symbols.
pub fn validate_sheet_name(name: &str) -> Result<(), ExpsheetError> {
    let len = name.chars().count();
    if len == 0 || len > 31 {
        return Err(ExpsheetError::Export(format!(
            "sheet name must be 1-31 characters, got {len}"
        )));
    }
    if let Some(c) = name.chars().find(|c| "[]:*?/\\".contains(*c)) {
        return Err(ExpsheetError::Export(format!(
            "sheet name '{name}' contains forbidden character '{c}'"
        )));
    }
    Ok(())
}

/// Spreadsheet column letters for a zero-based index: 0 → A, 25 → Z, 26 → AA.
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn workbook_xml(sheet_name: &str) -> Result<Vec<u8>, ExpsheetError> {
    let mut writer = Writer::new(Vec::new());
    write_decl(&mut writer)?;
    writer
        .write_event(Event::Start(
            BytesStart::new("workbook").with_attributes([("xmlns", MAIN_NS), ("xmlns:r", REL_NS)]),
        ))
        .map_err(export_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("sheets")))
        .map_err(export_error)?;
    writer
        .write_event(Event::Empty(BytesStart::new("sheet").with_attributes([
            ("name", sheet_name),
            ("sheetId", "1"),
            ("r:id", "rId1"),
        ])))
        .map_err(export_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("sheets")))
        .map_err(export_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("workbook")))
        .map_err(export_error)?;
    Ok(writer.into_inner())
}

fn sheet_xml(records: &RecordSet) -> Result<Vec<u8>, ExpsheetError> {
    let mut writer = Writer::new(Vec::new());
    write_decl(&mut writer)?;
    writer
        .write_event(Event::Start(
            BytesStart::new("worksheet").with_attributes([("xmlns", MAIN_NS)]),
        ))
        .map_err(export_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("sheetData")))
        .map_err(export_error)?;

    let header = records.columns().iter().map(|c| Some(c.as_str()));
    write_row(&mut writer, 1, header, Some(HEADER_STYLE))?;
    for (i, record) in records.rows().iter().enumerate() {
        let values = record.values().iter().map(|v| v.as_deref());
        write_row(&mut writer, i + 2, values, None)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("sheetData")))
        .map_err(export_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("worksheet")))
        .map_err(export_error)?;
    Ok(writer.into_inner())
}

fn write_row<'a>(
    writer: &mut Writer<Vec<u8>>,
    row_number: usize,
    values: impl Iterator<Item = Option<&'a str>>,
    style: Option<&str>,
) -> Result<(), ExpsheetError> {
    let r = row_number.to_string();
    writer
        .write_event(Event::Start(
            BytesStart::new("row").with_attributes([("r", r.as_str())]),
        ))
        .map_err(export_error)?;

    for (col, value) in values.enumerate() {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            continue;
        };
        let cell_ref = format!("{}{row_number}", column_letters(col));
        let mut cell = BytesStart::new("c");
        cell.push_attribute(("r", cell_ref.as_str()));
        cell.push_attribute(("t", "inlineStr"));
        if let Some(s) = style {
            cell.push_attribute(("s", s));
        }
        let text = strip_control_chars(value);

        writer.write_event(Event::Start(cell)).map_err(export_error)?;
        writer
            .write_event(Event::Start(BytesStart::new("is")))
            .map_err(export_error)?;
        writer
            .write_event(Event::Start(BytesStart::new("t")))
            .map_err(export_error)?;
        writer
            .write_event(Event::Text(BytesText::new(&text)))
            .map_err(export_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("t")))
            .map_err(export_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("is")))
            .map_err(export_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("c")))
            .map_err(export_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("row")))
        .map_err(export_error)?;
    Ok(())
}

fn write_decl(writer: &mut Writer<Vec<u8>>) -> Result<(), ExpsheetError> {
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(export_error)
}

/// XML 1.0 cannot carry most C0 control characters; PDF text sometimes has them.
fn strip_control_chars(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

fn export_error(e: impl Display) -> ExpsheetError {
    ExpsheetError::Export(e.to_string())
}
