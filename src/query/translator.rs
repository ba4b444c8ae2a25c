//! Free-text → document filter translation
//!
//! A simplified keyword parser, not NLP: each rule scans the lowercased
//! phrase independently and the results are unioned into one filter.
//! Later rules only override earlier ones when they target the same field.

use crate::query::filter::{Condition, DocumentFilter};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;

/// Recognized cities, in declaration order (first match wins).
pub const CITIES: &[&str] = &[
    "new york",
    "california",
    "texas",
    "florida",
    "chicago",
    "boston",
    "seattle",
];

/// Recognized sectors, in declaration order (first match wins).
pub const SECTORS: &[&str] = &[
    "technology",
    "healthcare",
    "finance",
    "energy",
    "real estate",
    "consumer goods",
];

/// Risk-tolerance vocabulary in priority order.
const RISK_TERMS: &[(&[&str], &str)] = &[
    (&["high risk", "aggressive"], "high"),
    (&["low risk", "conservative"], "low"),
    (&["medium risk", "moderate"], "medium"),
];

const HIGH_VALUE_THRESHOLD: f64 = 1_000_000.0;
const LOW_VALUE_THRESHOLD: f64 = 100_000.0;

lazy_static! {
    static ref AGE_PATTERN: Regex =
        Regex::new(r"aged?\s+(?:between\s+)?(\d+)(?:\s*-\s*(\d+))?|age\s+(\d+)").unwrap();
    static ref WORD_PATTERN: Regex = Regex::new(r"[a-zA-Z]+").unwrap();
}

/// Translate a free-text phrase into a structured filter.
///
/// When no rule fires, falls back to a best-effort disjunctive
/// contains-match across name, city and preferred sectors.
pub fn translate(phrase: &str) -> DocumentFilter {
    let query = phrase.to_lowercase();
    let mut filter = DocumentFilter::new();

    // Location: "from" plus a recognized city.
    if query.contains("from") {
        if let Some(city) = CITIES.iter().find(|city| query.contains(*city)) {
            filter.set("address.city", Condition::Contains((*city).to_string()));
        }
    }

    // Age: range or single value.
    if let Some(caps) = AGE_PATTERN.captures(&query) {
        if let Some(max) = caps.get(2) {
            let min: i64 = caps[1].parse().unwrap_or(0);
            let max: i64 = max.as_str().parse().unwrap_or(0);
            filter.set("age", Condition::Between { min, max });
        } else if let Some(single) = caps.get(3).or_else(|| caps.get(1)) {
            if let Ok(age) = single.as_str().parse::<i64>() {
                filter.set("age", Condition::Eq(json!(age)));
            }
        }
    }

    // Risk tolerance: first matching tier wins.
    for (terms, tolerance) in RISK_TERMS {
        if terms.iter().any(|term| query.contains(term)) {
            filter.set("risk_profile.tolerance", Condition::Eq(json!(tolerance)));
            break;
        }
    }

    // Sector membership: first match only.
    if let Some(sector) = SECTORS.iter().find(|sector| query.contains(*sector)) {
        filter.set(
            "investment_preferences.preferred_sectors",
            Condition::In(vec![(*sector).to_string()]),
        );
    }

    // Account-value tiers.
    if query.contains("high value") || query.contains("wealthy") {
        filter.set("account_value", Condition::Gte(HIGH_VALUE_THRESHOLD));
    } else if query.contains("low value") {
        filter.set("account_value", Condition::Lte(LOW_VALUE_THRESHOLD));
    }

    if filter.is_empty() {
        keyword_fallback(&query, &mut filter);
    }

    filter
}

/// Best-effort keyword search when no structured rule matched.
fn keyword_fallback(query: &str, filter: &mut DocumentFilter) {
    let keywords: Vec<&str> = WORD_PATTERN.find_iter(query).map(|m| m.as_str()).collect();
    if keywords.is_empty() {
        return;
    }

    let joined = keywords.join("|");
    filter.set(
        "$or",
        Condition::AnyOf(vec![
            ("name".to_string(), Condition::Contains(joined.clone())),
            ("address.city".to_string(), Condition::Contains(joined)),
            (
                "investment_preferences.preferred_sectors".to_string(),
                Condition::In(keywords.iter().map(|k| k.to_string()).collect()),
            ),
        ]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_contains_match() {
        let filter = translate("Find clients from New York");
        assert_eq!(
            filter.get("address.city"),
            Some(&Condition::Contains("new york".to_string()))
        );
    }

    #[test]
    fn test_city_requires_from() {
        let filter = translate("new york demographics");
        assert!(filter.get("address.city").is_none());
    }

    #[test]
    fn test_city_declaration_order() {
        // Both cities present: the first in declaration order wins.
        let filter = translate("clients from boston or seattle");
        assert_eq!(
            filter.get("address.city"),
            Some(&Condition::Contains("boston".to_string()))
        );
    }

    #[test]
    fn test_age_range() {
        let filter = translate("clients aged between 30-50");
        assert_eq!(
            filter.get("age"),
            Some(&Condition::Between { min: 30, max: 50 })
        );
    }

    #[test]
    fn test_age_single() {
        let filter = translate("clients with age 45");
        assert_eq!(filter.get("age"), Some(&Condition::Eq(json!(45))));
    }

    #[test]
    fn test_risk_priority_order() {
        let filter = translate("aggressive investors");
        assert_eq!(
            filter.get("risk_profile.tolerance"),
            Some(&Condition::Eq(json!("high")))
        );

        // "high risk" outranks "moderate" when both appear.
        let filter = translate("moderate to high risk clients");
        assert_eq!(
            filter.get("risk_profile.tolerance"),
            Some(&Condition::Eq(json!("high")))
        );

        let filter = translate("conservative clients");
        assert_eq!(
            filter.get("risk_profile.tolerance"),
            Some(&Condition::Eq(json!("low")))
        );
    }

    #[test]
    fn test_sector_first_match_only() {
        let filter = translate("clients interested in healthcare and energy");
        assert_eq!(
            filter.get("investment_preferences.preferred_sectors"),
            Some(&Condition::In(vec!["healthcare".to_string()]))
        );
    }

    #[test]
    fn test_value_tiers() {
        let filter = translate("show me wealthy clients");
        assert_eq!(
            filter.get("account_value"),
            Some(&Condition::Gte(1_000_000.0))
        );

        let filter = translate("low value accounts");
        assert_eq!(
            filter.get("account_value"),
            Some(&Condition::Lte(100_000.0))
        );
    }

    #[test]
    fn test_rules_union_into_one_filter() {
        let filter = translate("high risk clients from texas aged between 40-60");
        assert_eq!(filter.clauses().len(), 3);
        assert!(filter.get("address.city").is_some());
        assert!(filter.get("age").is_some());
        assert!(filter.get("risk_profile.tolerance").is_some());
    }

    #[test]
    fn test_keyword_fallback() {
        let filter = translate("anything about Smith");
        assert!(!filter.is_empty());
        let Some(Condition::AnyOf(branches)) = filter.get("$or") else {
            panic!("expected disjunctive fallback");
        };
        assert_eq!(branches.len(), 3);
        assert_eq!(branches[0].0, "name");
        assert_eq!(branches[1].0, "address.city");
    }
}
