//! Response classification
//!
//! Scores keyword overlap between the question, the rendered output and
//! two fixed vocabularies to decide whether the payload should be typed
//! as text, table or chart. Deterministic and total: ties and absence of
//! all signals default to text.

use lazy_static::lazy_static;
use regex::Regex;

/// Chart vocabulary matched against the question.
pub const CHART_KEYWORDS: &[&str] = &[
    "chart",
    "graph",
    "plot",
    "visualization",
    "compare",
    "comparison",
    "distribution",
    "trend",
    "performance",
    "top",
    "ranking",
    "vs",
];

/// Table vocabulary matched against the question.
pub const TABLE_KEYWORDS: &[&str] = &[
    "list",
    "table",
    "records",
    "entries",
    "details",
    "show me",
    "portfolio",
    "transactions",
    "clients",
];

/// Bonus hits scored against the rendered output.
const CHART_OUTPUT_HINTS: &[&str] = &["top", "best", "worst", "compare", "vs"];
const TABLE_OUTPUT_HINTS: &[&str] = &["records", "found", "list", "entries"];

lazy_static! {
    /// Currency, percentage or bare integer.
    static ref NUMBER_PATTERN: Regex = Regex::new(r"\$[\d,]+|\d+\.\d+%|\d+").unwrap();
    /// Labeled-field markers emitted by the renderers.
    static ref STRUCTURE_PATTERN: Regex = Regex::new(r"Name:|Age:|Value:|Record \d+").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Text,
    Table,
    Chart,
}

fn count_hits(haystack: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|kw| haystack.contains(**kw)).count()
}

/// Decide the payload kind for a (question, rendered output) pair.
pub fn classify(question: &str, output: &str) -> PayloadKind {
    let question_lower = question.to_lowercase();
    let output_lower = output.to_lowercase();

    let chart_score =
        count_hits(&question_lower, CHART_KEYWORDS) + count_hits(&output_lower, CHART_OUTPUT_HINTS);
    let table_score =
        count_hits(&question_lower, TABLE_KEYWORDS) + count_hits(&output_lower, TABLE_OUTPUT_HINTS);

    let has_numbers = NUMBER_PATTERN.is_match(output);
    let has_structure = STRUCTURE_PATTERN.is_match(output);

    if chart_score > table_score && has_numbers {
        PayloadKind::Chart
    } else if table_score > 0 || has_structure {
        PayloadKind::Table
    } else {
        PayloadKind::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_text() {
        assert_eq!(
            classify("why do markets exist", "Markets exist to match buyers and sellers."),
            PayloadKind::Text
        );
        assert_eq!(classify("", ""), PayloadKind::Text);
    }

    #[test]
    fn test_chart_needs_numbers() {
        // Chart keywords but no numeric content in the output: never a chart.
        assert_eq!(
            classify("compare the trend", "there is nothing to see"),
            PayloadKind::Text
        );
    }

    #[test]
    fn test_chart_when_score_wins_and_numbers_present() {
        let question = "Compare top portfolios vs last year";
        let output = "Top performer: $1,250,000";
        assert_eq!(classify(question, output), PayloadKind::Chart);
    }

    #[test]
    fn test_table_on_structured_output() {
        // No question keywords, but the output carries labeled fields.
        let output = "--- Record 1 ---\nName: Jane Miller\nAge: 42\n";
        assert_eq!(classify("anything", output), PayloadKind::Table);
    }

    #[test]
    fn test_table_keywords_in_question() {
        assert_eq!(
            classify("list the entries please", "nothing structured here"),
            PayloadKind::Table
        );
    }

    #[test]
    fn test_tie_defaults_away_from_chart() {
        // chart_score == table_score means the chart branch never fires.
        let question = "chart the list";
        let output = "value 100";
        assert_eq!(classify(question, output), PayloadKind::Table);
    }
}
