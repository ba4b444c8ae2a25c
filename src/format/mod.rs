//! Output formatting
//!
//! Classifies rendered answer text and shapes it into the typed payload
//! the HTTP layer returns. Chart formatting falls back to table, table
//! to plain text, so the formatter is total over arbitrary input.

pub mod chart;
pub mod classify;
pub mod table;
pub mod tuples;

use serde_json::{json, Value};
use tracing::debug;

use crate::models::QueryResponse;

pub use classify::PayloadKind;

pub struct ResponseFormatter;

impl ResponseFormatter {
    /// Shape rendered output into a typed response payload.
    pub fn format(question: &str, output: &str) -> QueryResponse {
        let kind = classify::classify(question, output);
        debug!(?kind, "classified response");
        match kind {
            PayloadKind::Chart => Self::as_chart(question, output),
            PayloadKind::Table => Self::as_table(question, output),
            PayloadKind::Text => Self::as_text(question, output),
        }
    }

    fn as_text(question: &str, output: &str) -> QueryResponse {
        QueryResponse {
            kind: "text".to_string(),
            data: Value::String(output.to_string()),
            metadata: json!({
                "question": question,
                "response_length": output.split_whitespace().count(),
            }),
        }
    }

    fn as_table(question: &str, output: &str) -> QueryResponse {
        let rows = table::extract_table(output);
        if rows.is_empty() {
            return Self::as_text(question, output);
        }
        let columns: Vec<&String> = rows[0].keys().collect();
        let metadata = json!({
            "question": question,
            "rows": rows.len(),
            "columns": columns,
        });
        QueryResponse {
            kind: "table".to_string(),
            data: json!(rows),
            metadata,
        }
    }

    fn as_chart(question: &str, output: &str) -> QueryResponse {
        let mut points = chart::extract_points(output);
        if points.is_empty() {
            // Second chance: mine any table rows for a numeric column.
            points = chart::points_from_rows(&table::extract_table(output));
        }
        if points.is_empty() {
            return Self::as_table(question, output);
        }
        let currency = points.iter().any(|p| p.currency);
        let data = json!({
            "chart_type": chart::chart_type(question),
            "data": points,
            "title": chart::chart_title(question),
            "x_label": chart::x_label(question),
            "y_label": chart::y_label(question, currency),
        });
        QueryResponse {
            kind: "chart".to_string(),
            data,
            metadata: json!({
                "question": question,
                "data_points": points.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_prose_is_text() {
        let response = ResponseFormatter::format(
            "why diversify",
            "Diversification spreads risk across holdings.",
        );
        assert_eq!(response.kind, "text");
        assert_eq!(response.metadata["response_length"], 5);
    }

    #[test]
    fn test_record_output_becomes_table() {
        let output = "Found 1 matching records:\n\n--- Record 1 ---\nName: Jane Miller\nAge: 42\n";
        let response = ResponseFormatter::format("list clients", output);
        assert_eq!(response.kind, "table");
        assert_eq!(response.metadata["rows"], 1);
        assert_eq!(response.data[0]["Name"], "Jane Miller");
    }

    #[test]
    fn test_ranking_output_becomes_chart() {
        let output = "Top Relationship Managers by Portfolio Value:\n\
                      1. Sarah Johnson: $12,500,000.00\n\
                      2. Mike Torres: $9,800,000.00\n";
        let response = ResponseFormatter::format("top managers ranking", output);
        assert_eq!(response.kind, "chart");
        assert_eq!(response.data["chart_type"], "bar");
        assert_eq!(response.data["y_label"], "Value ($)");
        assert_eq!(response.metadata["data_points"], 2);
    }

    #[test]
    fn test_rendered_records_extract_back_to_rows() {
        use serde_json::json;

        let docs: Vec<serde_json::Value> = (0..3u64)
            .map(|i| {
                json!({
                    "name": format!("Client {i}"),
                    "age": 30 + i,
                    "address": {"city": "Denver", "state": "CO"},
                    "account_value": 250_000.0,
                })
            })
            .collect();
        let rendered = crate::render::render_records(&docs);
        let response = ResponseFormatter::format("list client records", &rendered);
        assert_eq!(response.kind, "table");
        assert_eq!(response.metadata["rows"], 3);
        for i in 0..3usize {
            assert_eq!(response.data[i]["Name"], format!("Client {i}"));
            assert_eq!(response.data[i]["Age"], (30 + i).to_string());
        }
    }

    #[test]
    fn test_tuple_dump_answer_yields_five_rows() {
        let output = "Query returned 5 row(s):\n[\
            ('Ann Lee', Decimal('512000.00')), \
            ('Bob Ray', Decimal('450000.00')), \
            ('Cal Poe', Decimal('390000.00')), \
            ('Dan Oak', Decimal('210000.00')), \
            ('Eve Fox', Decimal('150000.00'))]";
        let response = ResponseFormatter::format("top 5 clients by equity holdings", output);
        assert!(response.kind == "table" || response.kind == "chart");
        let count = match response.kind.as_str() {
            "table" => response.metadata["rows"].as_u64(),
            _ => response.metadata["data_points"].as_u64(),
        };
        assert_eq!(count, Some(5));
    }

    #[test]
    fn test_chart_without_points_falls_back() {
        let response = ResponseFormatter::format(
            "compare top performers",
            "Found 2 results with strong performance overall",
        );
        // Numbers exist ("2") so the classifier picks chart, but no
        // label/value pairs can be extracted; falls through to text.
        assert_ne!(response.kind, "chart");
    }
}
