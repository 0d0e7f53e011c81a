//! CSV rendering for tabular message payloads.
//!
//! DESIGN
//! ======
//! RFC 4180 rules: CRLF record separators, fields quoted when they contain
//! a comma, quote, CR or LF, embedded quotes doubled. The header row comes
//! from the column labels; cells are looked up by column key in each row
//! object, with nulls and missing keys rendered empty.

use std::fmt::Write;

use crate::chat::types::TablePayload;

/// Render a tabular payload as CSV text.
#[must_use]
pub fn render_csv(table: &TablePayload) -> String {
    let mut out = String::new();
    write_record(&mut out, table.columns.iter().map(|c| c.label.clone()));

    for row in &table.rows {
        write_record(
            &mut out,
            table.columns.iter().map(|c| cell_text(row.get(&c.key))),
        );
    }
    out
}

fn write_record(out: &mut String, fields: impl Iterator<Item = String>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&escape_field(&field));
    }
    out.push_str("\r\n");
}

fn cell_text(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        let mut escaped = String::with_capacity(field.len() + 2);
        escaped.push('"');
        for ch in field.chars() {
            if ch == '"' {
                escaped.push('"');
            }
            escaped.push(ch);
        }
        escaped.push('"');
        escaped
    } else {
        field.to_string()
    }
}

/// Suggested download filename for a session export.
#[must_use]
pub fn export_filename(session_id: uuid::Uuid) -> String {
    let mut name = String::new();
    let _ = write!(name, "session-{session_id}.csv");
    name
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
