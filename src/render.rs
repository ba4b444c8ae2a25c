//! Result rendering
//!
//! Turns retrieved documents or aggregation rollups into the text block
//! the agent (and ultimately the extractor) consumes. Two layouts for
//! records: a summary for large result sets, detailed `--- Record N ---`
//! blocks otherwise.

use crate::models::ManagerRollup;
use crate::query::AggregationIntent;
use serde_json::Value;

pub const NO_MATCHES: &str = "No matching records found.";

/// Result-set size above which the summary layout is used.
const SUMMARY_THRESHOLD: usize = 10;
/// Abbreviated lines shown in the summary layout.
const SUMMARY_SAMPLE: usize = 5;

/// Render a list of retrieved records.
pub fn render_records(records: &[Value]) -> String {
    if records.is_empty() {
        return NO_MATCHES.to_string();
    }

    if records.len() > SUMMARY_THRESHOLD {
        render_summary(records)
    } else {
        render_detailed(records)
    }
}

fn render_summary(records: &[Value]) -> String {
    let mut out = format!("Found {} matching clients.\n\nSample results:\n", records.len());

    for (i, doc) in records.iter().take(SUMMARY_SAMPLE).enumerate() {
        let mut parts: Vec<String> = Vec::new();
        if let Some(name) = doc.get("name").and_then(Value::as_str) {
            parts.push(format!("Name: {}", name));
        }
        if let Some(age) = doc.get("age").and_then(Value::as_u64) {
            parts.push(format!("Age: {}", age));
        }
        if let Some(city) = doc
            .get("address")
            .and_then(|a| a.get("city"))
            .and_then(Value::as_str)
        {
            parts.push(format!("City: {}", city));
        }
        if let Some(value) = doc.get("account_value").and_then(Value::as_f64) {
            parts.push(format!("Account Value: {}", format_currency(value)));
        }
        out.push_str(&format!("{}. {}\n", i + 1, parts.join(", ")));
    }

    if records.len() > SUMMARY_SAMPLE {
        out.push_str(&format!(
            "... and {} more results.\n",
            records.len() - SUMMARY_SAMPLE
        ));
    }

    out
}

fn render_detailed(records: &[Value]) -> String {
    let mut out = format!("Found {} matching records:\n\n", records.len());

    for (i, doc) in records.iter().enumerate() {
        out.push_str(&format!("--- Record {} ---\n", i + 1));
        if let Some(fields) = doc.as_object() {
            for (key, value) in fields {
                if key == "_id" {
                    continue;
                }
                match value.as_object() {
                    // Recurse one level into nested objects, indented so the
                    // extractor keeps sub-fields out of the row.
                    Some(nested) => {
                        out.push_str(&format!("{}:\n", title_case(key)));
                        for (subkey, subvalue) in nested {
                            out.push_str(&format!(
                                "  {}: {}\n",
                                title_case(subkey),
                                scalar_to_string(subvalue)
                            ));
                        }
                    }
                    None => {
                        out.push_str(&format!(
                            "{}: {}\n",
                            title_case(key),
                            scalar_to_string(value)
                        ));
                    }
                }
            }
        }
        out.push('\n');
    }

    out
}

/// Render per-manager rollups as ranked blocks.
pub fn render_manager_rollups(rollups: &[ManagerRollup], intent: AggregationIntent) -> String {
    if rollups.is_empty() {
        return NO_MATCHES.to_string();
    }

    let (header, block_label) = match intent {
        AggregationIntent::TopManagers => {
            ("Top Relationship Managers by Portfolio Value:", "Rank")
        }
        AggregationIntent::ManagerBreakdown => {
            ("Portfolio Value Breakdown by Relationship Manager:", "Manager")
        }
    };

    let mut out = format!("{}\n\n", header);
    for (i, rollup) in rollups.iter().enumerate() {
        out.push_str(&format!("--- {} {} ---\n", block_label, i + 1));
        out.push_str(&format!("Name: {}\n", rollup.relationship_manager));
        if let Some(employee_id) = &rollup.manager_employee_id {
            out.push_str(&format!("Employee ID: {}\n", employee_id));
        }
        out.push_str(&format!(
            "Specialty: {}\n",
            rollup.manager_specialty.as_deref().unwrap_or("N/A")
        ));
        out.push_str(&format!("Client Count: {}\n", rollup.client_count));
        out.push_str(&format!(
            "Total Portfolio Value: {}\n",
            format_currency(rollup.total_portfolio_value)
        ));
        out.push_str(&format!(
            "Average Portfolio Value: {}\n",
            format_currency(rollup.avg_portfolio_value)
        ));
        out.push('\n');
    }

    out
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => "N/A".to_string(),
        other => other.to_string(),
    }
}

/// "account_value" -> "Account Value"
fn title_case(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// "$1,234,567.89"
pub fn format_currency(value: f64) -> String {
    let negative = value < 0.0;
    let cents = format!("{:.2}", value.abs());
    let (integer, decimals) = cents.split_once('.').unwrap_or((&cents, "00"));
    let grouped = group_thousands(integer);
    if negative {
        format!("-${}.{}", grouped, decimals)
    } else {
        format!("${}.{}", grouped, decimals)
    }
}

/// Thousands-group a plain integer string.
pub fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(name: &str, age: u64, city: &str, value: f64) -> Value {
        json!({
            "_id": "internal",
            "name": name,
            "age": age,
            "address": { "city": city, "state": "NY" },
            "account_value": value,
        })
    }

    #[test]
    fn test_empty_input_renders_sentinel() {
        assert_eq!(render_records(&[]), NO_MATCHES);
        assert_eq!(
            render_manager_rollups(&[], AggregationIntent::TopManagers),
            NO_MATCHES
        );
    }

    #[test]
    fn test_detailed_layout_at_most_ten() {
        let docs: Vec<Value> = (0..3u64)
            .map(|i| doc(&format!("Client {}", i), 30 + i, "New York", 10_000.0))
            .collect();
        let text = render_records(&docs);

        assert!(text.starts_with("Found 3 matching records:"));
        assert!(text.contains("--- Record 1 ---"));
        assert!(text.contains("--- Record 3 ---"));
        assert!(text.contains("Name: Client 0"));
        // Internal identifier is never rendered.
        assert!(!text.contains("internal"));
        // Nested objects are recursed one level, indented.
        assert!(text.contains("Address:\n  City: New York"));
        assert!(text.contains("Account Value: $10,000.00"));
    }

    #[test]
    fn test_summary_layout_above_ten() {
        let docs: Vec<Value> = (0..12)
            .map(|i| doc(&format!("Client {}", i), 30, "Boston", 5_000.0))
            .collect();
        let text = render_records(&docs);

        assert!(text.starts_with("Found 12 matching clients."));
        assert!(text.contains("1. Name: Client 0"));
        assert!(text.contains("5. Name: Client 4"));
        assert!(!text.contains("6. Name:"));
        assert!(text.contains("... and 7 more results."));
    }

    #[test]
    fn test_summary_skips_absent_fields() {
        let docs: Vec<Value> = (0..11).map(|_| json!({ "name": "Nameless Co" })).collect();
        let text = render_records(&docs);
        assert!(text.contains("1. Name: Nameless Co\n"));
        assert!(!text.contains("Age:"));
    }

    #[test]
    fn test_rollup_rendering_with_currency() {
        let rollups = vec![ManagerRollup {
            relationship_manager: "Sarah Johnson".into(),
            client_count: 3,
            total_portfolio_value: 4_500_000.0,
            avg_portfolio_value: 1_500_000.0,
            manager_specialty: Some("High Net Worth".into()),
            manager_employee_id: Some("RM001".into()),
        }];

        let text = render_manager_rollups(&rollups, AggregationIntent::TopManagers);
        assert!(text.starts_with("Top Relationship Managers by Portfolio Value:"));
        assert!(text.contains("--- Rank 1 ---"));
        assert!(text.contains("Employee ID: RM001"));
        assert!(text.contains("Total Portfolio Value: $4,500,000.00"));

        let breakdown = render_manager_rollups(
            &[ManagerRollup {
                manager_employee_id: None,
                ..rollups[0].clone()
            }],
            AggregationIntent::ManagerBreakdown,
        );
        assert!(breakdown.contains("--- Manager 1 ---"));
        assert!(!breakdown.contains("Employee ID"));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.5), "$999.50");
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_currency(-2500.0), "-$2,500.00");
    }
}
