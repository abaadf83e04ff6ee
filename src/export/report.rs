//! Comma-style spreadsheet export.
//!
//! Documents start with a UTF-8 byte-order mark so spreadsheet applications pick the
//! right encoding, may carry `#` comment lines describing the export, and quote only
//! the cells that need it.

use super::{ExportOptions, Record, Sheet};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt::Write as _;

const BOM: char = '\u{FEFF}';
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Renders `records` as a delimited document. Columns come from the first record.
pub fn serialize(records: &[Record], options: &ExportOptions) -> String {
    let mut out = String::new();
    if records.is_empty() {
        return out;
    }
    out.push(BOM);
    write_document(&mut out, records, options);
    out
}

/// Renders named record lists as consecutive sections under one metadata block.
pub fn serialize_multiple(sheets: &[Sheet], options: &ExportOptions) -> String {
    let mut out = String::new();
    out.push(BOM);
    out.push_str("# Multi-Sheet Report\n");
    write_generated_line(&mut out, options.generated_at());
    let _ = writeln!(out, "# Sheets: {}", sheets.len());
    out.push('\n');

    let section_options = ExportOptions {
        include_metadata: false,
        ..options.clone()
    };
    for (idx, sheet) in sheets.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "# ===== {} =====", sheet.name);
        if !sheet.records.is_empty() {
            write_document(&mut out, &sheet.records, &section_options);
        }
    }
    log::debug!("serialized {} sheets", sheets.len());
    out
}

fn write_document(out: &mut String, records: &[Record], options: &ExportOptions) {
    let Some(first) = records.first() else {
        return;
    };
    let delimiter = options.delimiter;

    if options.include_metadata && !options.metadata.is_empty() {
        let _ = writeln!(out, "# {}", options.sheet_name);
        write_generated_line(out, options.generated_at());
        for (label, value) in &options.metadata {
            let _ = writeln!(out, "# {}: {}", label, display_value(Some(value)));
        }
        out.push('\n');
    }

    let columns: Vec<&String> = first.keys().collect();
    if options.include_header {
        let header: Vec<String> = columns
            .iter()
            .map(|name| escape_text(name, delimiter))
            .collect();
        push_row(out, &header, delimiter);
    }

    for record in records {
        let cells: Vec<String> = columns
            .iter()
            .map(|name| escape_value(record.get(name.as_str()), delimiter))
            .collect();
        push_row(out, &cells, delimiter);
    }
}

fn push_row(out: &mut String, cells: &[String], delimiter: char) {
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            out.push(delimiter);
        }
        out.push_str(cell);
    }
    out.push('\n');
}

fn write_generated_line(out: &mut String, generated_at: DateTime<Utc>) {
    let _ = writeln!(out, "# Generated: {}", generated_at.format(TIMESTAMP_FORMAT));
}

/// Plain text of a cell before quoting. Null and missing cells are empty.
pub(crate) fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Cell text for `value`, quoted when it holds the delimiter, a quote or a newline.
pub fn escape_value(value: Option<&Value>, delimiter: char) -> String {
    escape_text(&display_value(value), delimiter)
}

fn escape_text(text: &str, delimiter: char) -> String {
    if text.contains(delimiter) || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escape_quotes_only_when_needed() {
        assert_eq!(escape_value(Some(&json!("plain")), ','), "plain");
        assert_eq!(
            escape_value(Some(&json!("He said \"hi\", bye")), ','),
            "\"He said \"\"hi\"\", bye\""
        );
        assert_eq!(escape_value(Some(&json!("a;b")), ';'), "\"a;b\"");
        assert_eq!(escape_value(Some(&json!("a;b")), ','), "a;b");
        assert_eq!(escape_value(Some(&json!("line\nbreak")), ','), "\"line\nbreak\"");
    }

    #[test]
    fn scalars_render_as_plain_text() {
        assert_eq!(escape_value(None, ','), "");
        assert_eq!(escape_value(Some(&Value::Null), ','), "");
        assert_eq!(escape_value(Some(&json!(true)), ','), "true");
        assert_eq!(escape_value(Some(&json!(42)), ','), "42");
        assert_eq!(escape_value(Some(&json!(2.5)), ','), "2.5");
    }
}
