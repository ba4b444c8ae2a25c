//! Chart extraction
//!
//! Pulls label/value pairs out of rendered output and derives the chart
//! type, title and axis labels from the question wording. When nothing
//! matches the line patterns, previously extracted table rows are mined
//! for a numeric column as a fallback.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::format::table::TableRow;

pub const TITLE_MAX: usize = 50;

/// A single plotted point.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    #[serde(skip)]
    pub currency: bool,
}

lazy_static! {
    /// `Label: $1,234.56` anywhere on a line.
    static ref LABELED_VALUE: Regex =
        Regex::new(r"(\w+(?:\s+\w+)*?):\s*(\$?)([\d,]+\.?\d*)").unwrap();
    /// `1. Label: $1,234.56` numbered ranking lines.
    static ref NUMBERED_VALUE: Regex =
        Regex::new(r"\d+\.\s+([^:\n]+):\s*(\$?)([\d,]+\.?\d*)").unwrap();
    /// `Label - $1,234.56` dashed pairs.
    static ref DASHED_VALUE: Regex =
        Regex::new(r"([A-Za-z][A-Za-z\s]*?)\s*-\s*(\$?)([\d,]+\.?\d*)").unwrap();
}

/// Extract chart points from rendered output. The three line patterns
/// are tried in order and the first that yields any points wins.
pub fn extract_points(output: &str) -> Vec<ChartPoint> {
    for pattern in [&*NUMBERED_VALUE, &*LABELED_VALUE, &*DASHED_VALUE] {
        let points: Vec<ChartPoint> = pattern
            .captures_iter(output)
            .filter_map(|caps| {
                let value = parse_number(&caps[3])?;
                Some(ChartPoint {
                    label: caps[1].trim().to_string(),
                    value,
                    currency: &caps[2] == "$",
                })
            })
            .collect();
        if !points.is_empty() {
            return points;
        }
    }
    Vec::new()
}

/// Fallback: build points from already-extracted table rows by pairing
/// the first column with the first numeric-looking column.
pub fn points_from_rows(rows: &[TableRow]) -> Vec<ChartPoint> {
    let mut points = Vec::new();
    for row in rows {
        let mut cells = row.values().filter_map(|v| v.as_str());
        let Some(label) = cells.next() else { continue };
        for cell in cells {
            let currency = cell.contains('$');
            if currency || looks_numeric(cell) {
                if let Some(value) = parse_number(cell) {
                    points.push(ChartPoint {
                        label: label.to_string(),
                        value,
                        currency,
                    });
                    break;
                }
            }
        }
    }
    points
}

fn looks_numeric(s: &str) -> bool {
    let stripped: String = s.chars().filter(|c| *c != ',' && *c != '.').collect();
    !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit())
}

fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().ok()
}

/// Pick a chart type from the question wording.
pub fn chart_type(question: &str) -> &'static str {
    let q = question.to_lowercase();
    if q.contains("distribution") || q.contains("breakdown") {
        "pie"
    } else if q.contains("compare") || q.contains("vs") {
        "bar"
    } else if q.contains("trend") || q.contains("over time") {
        "line"
    } else if q.contains("top") || q.contains("ranking") {
        "bar"
    } else {
        "bar"
    }
}

/// Title-cased question, question marks trimmed, truncated with an
/// ellipsis past [`TITLE_MAX`] characters.
pub fn chart_title(question: &str) -> String {
    let title: String = question
        .trim()
        .trim_matches('?')
        .trim()
        .split_whitespace()
        .map(title_word)
        .collect::<Vec<_>>()
        .join(" ");
    if title.chars().count() > TITLE_MAX {
        let prefix: String = title.chars().take(TITLE_MAX - 3).collect();
        format!("{prefix}...")
    } else {
        title
    }
}

fn title_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn x_label(question: &str) -> &'static str {
    let q = question.to_lowercase();
    if q.contains("client") {
        "Clients"
    } else if q.contains("portfolio") {
        "Portfolios"
    } else if q.contains("sector") {
        "Sectors"
    } else {
        "Categories"
    }
}

pub fn y_label(question: &str, currency: bool) -> &'static str {
    if currency {
        return "Value ($)";
    }
    let q = question.to_lowercase();
    if q.contains("count") || q.contains("number") {
        "Count"
    } else if q.contains("percentage") || q.contains('%') {
        "Percentage (%)"
    } else {
        "Value"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};

    #[test]
    fn test_numbered_ranking_lines() {
        let output = "Top Relationship Managers by Portfolio Value:\n\
                      1. Sarah Johnson: $12,500,000.00\n\
                      2. Mike Torres: $9,800,000.00\n";
        let points = extract_points(output);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "Sarah Johnson");
        assert_eq!(points[0].value, 12_500_000.0);
        assert!(points[0].currency);
    }

    #[test]
    fn test_dashed_pairs() {
        let output = "Technology - 42\nHealthcare - 31\n";
        let points = extract_points(output);
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].label, "Healthcare");
        assert_eq!(points[1].value, 31.0);
        assert!(!points[1].currency);
    }

    #[test]
    fn test_fallback_from_rows() {
        let mut row = Map::new();
        row.insert("Name".into(), Value::String("Jane Miller".into()));
        row.insert("City".into(), Value::String("Boston".into()));
        row.insert("Account Value".into(), Value::String("$1,200,000.00".into()));
        let points = points_from_rows(&[row]);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "Jane Miller");
        assert_eq!(points[0].value, 1_200_000.0);
    }

    #[test]
    fn test_chart_type_selection() {
        assert_eq!(chart_type("age distribution of clients"), "pie");
        assert_eq!(chart_type("compare equities vs bonds"), "bar");
        assert_eq!(chart_type("portfolio trend over time"), "line");
        assert_eq!(chart_type("top 10 managers"), "bar");
        assert_eq!(chart_type("anything else"), "bar");
    }

    #[test]
    fn test_title_truncation() {
        assert_eq!(chart_title("show me top clients?"), "Show Me Top Clients");
        let long = "show me the complete breakdown of every single client portfolio";
        let title = chart_title(long);
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().count(), TITLE_MAX);
    }

    #[test]
    fn test_axis_labels() {
        assert_eq!(x_label("top clients by value"), "Clients");
        assert_eq!(x_label("sector exposure"), "Sectors");
        assert_eq!(x_label("something else"), "Categories");
        assert_eq!(y_label("any", true), "Value ($)");
        assert_eq!(y_label("number of accounts", false), "Count");
        assert_eq!(y_label("plain", false), "Value");
    }
}
