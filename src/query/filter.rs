//! Structured document filters
//!
//! A `DocumentFilter` is an ordered mapping from dotted field path to a
//! condition. It is built fresh per query, serialized into the literal
//! query document the store driver expects, and can also be evaluated
//! directly against JSON documents (in-memory store, tests).

use serde_json::{json, Map, Value};

/// One condition on a dotted field path.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Exact equality against a JSON value.
    Eq(Value),
    /// Case-insensitive contains-match. The pattern may carry `|`-separated
    /// alternatives (the keyword-fallback path joins tokens that way).
    Contains(String),
    /// Inclusive numeric range.
    Between { min: i64, max: i64 },
    /// Numeric greater-or-equal.
    Gte(f64),
    /// Numeric less-or-equal.
    Lte(f64),
    /// Membership: the field is an array containing any of these values.
    In(Vec<String>),
    /// Disjunction over sub-clauses, each with its own path.
    AnyOf(Vec<(String, Condition)>),
}

/// Ordered field-path → condition mapping with last-write-wins per path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentFilter {
    clauses: Vec<(String, Condition)>,
}

impl DocumentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a condition for a path. A later write to the same path replaces
    /// the earlier one (last-write-wins), preserving insertion position of
    /// the other clauses.
    pub fn set(&mut self, path: impl Into<String>, condition: Condition) {
        let path = path.into();
        if let Some(existing) = self.clauses.iter_mut().find(|(p, _)| *p == path) {
            existing.1 = condition;
        } else {
            self.clauses.push((path, condition));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[(String, Condition)] {
        &self.clauses
    }

    pub fn get(&self, path: &str) -> Option<&Condition> {
        self.clauses
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c)
    }

    /// The literal query document sent to the document store.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        for (path, condition) in &self.clauses {
            match condition {
                Condition::AnyOf(branches) => {
                    let alternatives: Vec<Value> = branches
                        .iter()
                        .map(|(p, c)| json!({ p.clone(): condition_value(c) }))
                        .collect();
                    doc.insert("$or".to_string(), Value::Array(alternatives));
                }
                other => {
                    doc.insert(path.clone(), condition_value(other));
                }
            }
        }
        Value::Object(doc)
    }

    /// Evaluate the filter against a JSON document. An empty filter
    /// matches everything.
    pub fn matches(&self, doc: &Value) -> bool {
        self.clauses
            .iter()
            .all(|(path, condition)| clause_matches(doc, path, condition))
    }
}

fn condition_value(condition: &Condition) -> Value {
    match condition {
        Condition::Eq(v) => v.clone(),
        Condition::Contains(pattern) => json!({ "$regex": pattern, "$options": "i" }),
        Condition::Between { min, max } => json!({ "$gte": min, "$lte": max }),
        Condition::Gte(v) => json!({ "$gte": v }),
        Condition::Lte(v) => json!({ "$lte": v }),
        Condition::In(values) => json!({ "$in": values }),
        // Nested disjunctions are not produced by the translator.
        Condition::AnyOf(_) => Value::Null,
    }
}

fn clause_matches(doc: &Value, path: &str, condition: &Condition) -> bool {
    match condition {
        Condition::AnyOf(branches) => branches
            .iter()
            .any(|(p, c)| clause_matches(doc, p, c)),
        _ => {
            let Some(field) = resolve_path(doc, path) else {
                return false;
            };
            value_matches(field, condition)
        }
    }
}

fn resolve_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn value_matches(field: &Value, condition: &Condition) -> bool {
    match condition {
        Condition::Eq(expected) => values_equal(field, expected),
        Condition::Contains(pattern) => {
            let Some(text) = field.as_str() else {
                return false;
            };
            let haystack = text.to_lowercase();
            pattern
                .split('|')
                .any(|alt| !alt.is_empty() && haystack.contains(&alt.to_lowercase()))
        }
        Condition::Between { min, max } => field
            .as_f64()
            .map(|v| v >= *min as f64 && v <= *max as f64)
            .unwrap_or(false),
        Condition::Gte(bound) => field.as_f64().map(|v| v >= *bound).unwrap_or(false),
        Condition::Lte(bound) => field.as_f64().map(|v| v <= *bound).unwrap_or(false),
        Condition::In(values) => {
            let Some(items) = field.as_array() else {
                return false;
            };
            items.iter().any(|item| {
                item.as_str()
                    .map(|s| values.iter().any(|v| v.eq_ignore_ascii_case(s)))
                    .unwrap_or(false)
            })
        }
        Condition::AnyOf(_) => false,
    }
}

fn values_equal(field: &Value, expected: &Value) -> bool {
    // Numeric equality across integer/float representations.
    if let (Some(a), Some(b)) = (field.as_f64(), expected.as_f64()) {
        return a == b;
    }
    field == expected
}
