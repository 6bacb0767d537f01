use expsheet_core::model::RecordSet;

pub fn print(records: &RecordSet) {
    print!("{}", format_records(records));
}

/// Render records as an aligned text table for the terminal.
pub fn format_records(records: &RecordSet) -> String {
    let columns = records.columns();
    let mut widths: Vec<usize> = columns.iter().map(|c| display_width(c)).collect();
    for record in records.rows() {
        for (i, value) in record.values().iter().enumerate() {
            let w = value.as_deref().map(display_width).unwrap_or(0);
            widths[i] = widths[i].max(w);
        }
    }

    let mut out = String::new();
    push_line(&mut out, columns.iter().map(|c| c.as_str()), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    for record in records.rows() {
        push_line(
            &mut out,
            record.values().iter().map(|v| v.as_deref().unwrap_or("")),
            &widths,
        );
    }
    out.push_str(&format!("\n({} row(s))\n", records.len()));
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(display_width(cell));
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}

/// Terminal columns used by `s`; Hangul, CJK, fullwidth forms and common
/// emoji take two.
///
/// Approximate: combining marks and less common wide glyphs count as one, so
/// alignment can drift for such cells.
fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| match c as u32 {
            0x1100..=0x115F | 0x2E80..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F | 0xFF00..=0xFF60 | 0xFFE0..=0xFFE6 => 2,
            0x1F300..=0x1F64F | 0x1F900..=0x1F9FF | 0x20000..=0x3FFFD => 2,
            _ => 1,
        })
        .sum()
}
