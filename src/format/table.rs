//! Table extraction
//!
//! Turns rendered text output back into structured rows. Four strategies
//! run in a fixed order and the first one that yields rows wins; if none
//! fire the caller falls back to a plain text payload.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::format::tuples::{self, SqlValue};
use crate::render::format_currency;

/// One extracted row, column order preserved.
pub type TableRow = Map<String, Value>;

/// Column headers applied to ten-column tuple dumps (the market data
/// schema). Narrower or wider rows get positional `Column N` headers.
pub const MARKET_DATA_COLUMNS: &[&str] = &[
    "ID",
    "Security ID",
    "Date",
    "Open Price",
    "High Price",
    "Low Price",
    "Close Price",
    "Volume",
    "Adjusted Close",
    "Created At",
];

type Strategy = (&'static str, fn(&str) -> Vec<TableRow>);

/// Extraction strategies, tried in order.
const STRATEGIES: &[Strategy] = &[
    ("tuple_dump", extract_tuple_rows),
    ("record_blocks", extract_record_blocks),
    ("numbered_list", extract_numbered_list),
    ("marker_lines", extract_marker_lines),
];

lazy_static! {
    static ref RECORD_MARKER: Regex = Regex::new(r"--- Record \d+ ---").unwrap();
    static ref NUMBERED_ITEM: Regex = Regex::new(r"\d+\.\s+(.+)").unwrap();
    static ref NUMBERED_DETECT: Regex = Regex::new(r"\d+\.\s+.*?:").unwrap();
    static ref FIELD_PAIR: Regex = Regex::new(r"(\w+):\s*([^,\n]+)").unwrap();
}

/// Run the strategy chain and return the first non-empty row set.
pub fn extract_table(output: &str) -> Vec<TableRow> {
    for (name, strategy) in STRATEGIES {
        let rows = strategy(output);
        if !rows.is_empty() {
            debug!(strategy = name, rows = rows.len(), "extracted table");
            return rows;
        }
    }
    Vec::new()
}

/// Strategy 1: database tuple dumps.
fn extract_tuple_rows(output: &str) -> Vec<TableRow> {
    if !tuples::looks_like_tuple_dump(output) {
        return Vec::new();
    }
    let parsed = tuples::parse_tuple_dump(output);
    if parsed.is_empty() {
        return Vec::new();
    }
    let arity = parsed.iter().map(Vec::len).max().unwrap_or(0);
    parsed
        .iter()
        .map(|row| {
            let mut out = TableRow::new();
            for (i, value) in row.iter().enumerate() {
                let column = column_name(i, arity);
                out.insert(column.clone(), Value::String(format_cell(value, &column)));
            }
            out
        })
        .collect()
}

fn column_name(index: usize, arity: usize) -> String {
    if arity == MARKET_DATA_COLUMNS.len() {
        if let Some(name) = MARKET_DATA_COLUMNS.get(index) {
            return (*name).to_string();
        }
    }
    format!("Column {}", index + 1)
}

/// Column-aware display formatting for a tuple cell.
fn format_cell(value: &SqlValue, column: &str) -> String {
    match value {
        SqlValue::Null => "N/A".to_string(),
        SqlValue::Int(n) => {
            if column.contains("Volume") {
                group_int(*n)
            } else {
                n.to_string()
            }
        }
        SqlValue::Float(_) | SqlValue::Decimal(_) => {
            let n = value.as_f64().unwrap_or(0.0);
            if column.contains("Price") || column.contains("Close") {
                format_currency(n)
            } else {
                // Grouped, two decimal places, no currency symbol.
                format_currency(n).trim_start_matches('$').to_string()
            }
        }
        SqlValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        SqlValue::DateTime(dt) => dt.format("%Y-%m-%d").to_string(),
        SqlValue::Text(s) => s.clone(),
    }
}

fn group_int(n: i64) -> String {
    let negative = n < 0;
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Strategy 2: `--- Record N ---` blocks from the detailed renderer.
fn extract_record_blocks(output: &str) -> Vec<TableRow> {
    if !RECORD_MARKER.is_match(output) {
        return Vec::new();
    }
    let mut rows = Vec::new();
    for block in RECORD_MARKER.split(output).skip(1) {
        let mut row = TableRow::new();
        for line in block.lines() {
            // Indented lines belong to nested objects, skip them.
            if line.starts_with(' ') {
                continue;
            }
            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim();
                let value = value.trim();
                if !key.is_empty() && !value.is_empty() {
                    row.insert(key.to_string(), Value::String(value.to_string()));
                }
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    rows
}

/// Strategy 3: numbered list items with labeled fields.
fn extract_numbered_list(output: &str) -> Vec<TableRow> {
    if !NUMBERED_DETECT.is_match(output) {
        return Vec::new();
    }
    let mut rows = Vec::new();
    for caps in NUMBERED_ITEM.captures_iter(output) {
        let mut row = TableRow::new();
        for part in caps[1].split(',') {
            let part = part.trim();
            if let Some((key, value)) = part.split_once(':') {
                row.insert(
                    key.trim().to_string(),
                    Value::String(value.trim().to_string()),
                );
            } else if !part.is_empty() {
                row.insert("Description".to_string(), Value::String(part.to_string()));
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    rows
}

/// Strategy 4: loose `Key: value` lines, gated on a result banner plus a
/// monetary hint so prose does not get shredded into fake rows.
fn extract_marker_lines(output: &str) -> Vec<TableRow> {
    let monetary = output.contains('$') || output.contains('%') || output.contains("Value");
    if !output.contains("Found") || !monetary {
        return Vec::new();
    }
    let mut rows = Vec::new();
    for line in output.lines() {
        if !(line.contains("Name:") || line.contains("Client:") || line.contains("Portfolio:")) {
            continue;
        }
        let mut row = TableRow::new();
        for caps in FIELD_PAIR.captures_iter(line) {
            row.insert(
                caps[1].to_string(),
                Value::String(caps[2].trim().to_string()),
            );
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_dump_gets_market_columns() {
        let output = "Query returned 1 row(s):\n\
                      [(1, 'AAPL', datetime.date(2024, 1, 15), Decimal('185.50'), \
                      Decimal('187.20'), Decimal('184.10'), Decimal('186.75'), \
                      52000000, Decimal('186.75'), datetime.datetime(2024, 1, 15, 18, 30, 0))]";
        let rows = extract_table(output);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row["ID"], "1");
        assert_eq!(row["Security ID"], "AAPL");
        assert_eq!(row["Date"], "2024-01-15");
        assert_eq!(row["Open Price"], "$185.50");
        assert_eq!(row["Volume"], "52,000,000");
        assert_eq!(row["Created At"], "2024-01-15");
    }

    #[test]
    fn test_tuple_dump_positional_columns_when_not_market_shape() {
        let output = "[(1, Decimal('2.50'), 'x')]";
        let rows = extract_table(output);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains_key("Column 1"));
        assert!(rows[0].contains_key("Column 3"));
    }

    #[test]
    fn test_record_blocks() {
        let output = "Found 2 matching records:\n\n\
                      --- Record 1 ---\nName: Jane Miller\nAge: 42\n  Street: ignored\n\n\
                      --- Record 2 ---\nName: Tom Chen\nAge: 35\n";
        let rows = extract_record_blocks(output);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Name"], "Jane Miller");
        assert_eq!(rows[1]["Age"], "35");
        assert!(!rows[0].contains_key("Street"));
    }

    #[test]
    fn test_numbered_list() {
        let output = "Found 12 matching clients. Showing first 5:\n\
                      1. Name: Jane Miller, Age: 42, City: Boston\n\
                      2. Name: Tom Chen, Age: 35, City: Chicago\n";
        let rows = extract_numbered_list(output);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["City"], "Boston");
        assert_eq!(rows[1]["Name"], "Tom Chen");
    }

    #[test]
    fn test_marker_lines_require_banner_and_money() {
        let no_banner = "Name: Jane Miller $100";
        assert!(extract_marker_lines(no_banner).is_empty());

        let output = "Found results:\nName: Jane Miller, Value: $1,200,000\n";
        let rows = extract_marker_lines(output);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Name"], "Jane Miller");
    }

    #[test]
    fn test_no_strategy_fires_on_prose() {
        assert!(extract_table("Markets move on sentiment and earnings.").is_empty());
    }
}
