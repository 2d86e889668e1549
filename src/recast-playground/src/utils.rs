//! Formatting helpers for query results.

use std::fmt::Write;

use common_display::truncate_label;
use recast_core::Value;

const COLUMN_WIDTH: usize = 15;
const MAX_ROWS: usize = 100;

/// Print a section header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a divider line.
pub fn print_divider() {
    println!("{}", "-".repeat(60));
}

/// Print rows as a table.
pub fn print_rows(rows: &[Value]) {
    print!("{}", format_rows(rows));
    println!("Total rows: {}", rows.len());
}

/// Format rows as a table.
///
/// Record rows get one column per field; other rows a single `value` column.
pub fn format_rows(rows: &[Value]) -> String {
    let mut output = String::new();

    let Some(first) = rows.first() else {
        output.push_str("(empty result set)\n");
        return output;
    };

    let header: Vec<String> = match first {
        Value::Record(record) => record.iter().map(|(name, _)| name.to_string()).collect(),
        _ => vec!["value".to_string()],
    };
    write_row(&mut output, &header);
    output.push('|');
    for _ in &header {
        let _ = write!(output, "{:-<width$}|", "", width = COLUMN_WIDTH + 2);
    }
    output.push('\n');

    for row in rows.iter().take(MAX_ROWS) {
        let cells: Vec<String> = match row {
            Value::Record(record) => record.iter().map(|(_, v)| format_value(v)).collect(),
            other => vec![format_value(other)],
        };
        write_row(&mut output, &cells);
    }
    if rows.len() > MAX_ROWS {
        let _ = writeln!(output, "... (showing first {MAX_ROWS} of {} rows)", rows.len());
    }

    output
}

fn write_row(output: &mut String, cells: &[String]) {
    output.push_str("| ");
    for cell in cells {
        let _ = write!(
            output,
            "{:width$} | ",
            truncate_label(cell, COLUMN_WIDTH),
            width = COLUMN_WIDTH
        );
    }
    output.push('\n');
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
