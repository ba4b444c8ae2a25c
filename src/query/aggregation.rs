//! Aggregation intent detection
//!
//! Two fixed intents over the clients collection, checked in order. Each
//! maps to a canned grouping pipeline expressed as a literal stage list
//! for the document-store contract.

use serde_json::{json, Value};

pub const TOP_MANAGERS_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationIntent {
    /// Full breakdown by relationship manager, descending total value.
    ManagerBreakdown,
    /// Top relationship managers, descending total value, limited to 10.
    TopManagers,
}

/// Recognize an aggregation intent in a free-text phrase. Returns `None`
/// when the caller should take the point-query path instead.
pub fn detect(phrase: &str) -> Option<AggregationIntent> {
    let query = phrase.to_lowercase();

    if query.contains("relationship manager")
        && (query.contains("group") || query.contains("breakdown") || query.contains("portfolio"))
    {
        return Some(AggregationIntent::ManagerBreakdown);
    }

    if query.contains("top") && query.contains("relationship manager") {
        return Some(AggregationIntent::TopManagers);
    }

    None
}

impl AggregationIntent {
    pub fn limit(&self) -> Option<usize> {
        match self {
            AggregationIntent::ManagerBreakdown => None,
            AggregationIntent::TopManagers => Some(TOP_MANAGERS_LIMIT),
        }
    }

    /// The literal pipeline stage list sent to the document store.
    pub fn pipeline_stages(&self) -> Vec<Value> {
        let mut group = json!({
            "_id": "$relationship_manager.name",
            "client_count": { "$sum": 1 },
            "total_portfolio_value": { "$sum": "$account_value" },
            "avg_portfolio_value": { "$avg": "$account_value" },
            "manager_specialty": { "$first": "$relationship_manager.specialty" },
        });
        let mut project = json!({
            "relationship_manager": "$_id",
            "client_count": 1,
            "total_portfolio_value": 1,
            "avg_portfolio_value": 1,
            "manager_specialty": 1,
            "_id": 0,
        });

        if matches!(self, AggregationIntent::TopManagers) {
            group["manager_employee_id"] = json!({ "$first": "$relationship_manager.employee_id" });
            project["manager_employee_id"] = json!(1);
        }

        let mut stages = vec![
            json!({ "$match": { "relationship_manager": { "$exists": true } } }),
            json!({ "$group": group }),
            json!({ "$sort": { "total_portfolio_value": -1 } }),
        ];
        if let Some(limit) = self.limit() {
            stages.push(json!({ "$limit": limit }));
        }
        stages.push(json!({ "$project": project }));
        stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_detection() {
        assert_eq!(
            detect("portfolio breakdown by relationship manager"),
            Some(AggregationIntent::ManagerBreakdown)
        );
        assert_eq!(
            detect("group clients by relationship manager"),
            Some(AggregationIntent::ManagerBreakdown)
        );
    }

    #[test]
    fn test_top_managers_detection() {
        assert_eq!(
            detect("top relationship managers"),
            Some(AggregationIntent::TopManagers)
        );
    }

    #[test]
    fn test_breakdown_checked_first() {
        // Carries both "top" and "portfolio": the breakdown rule wins
        // because it is checked first.
        assert_eq!(
            detect("top relationship managers by portfolio value"),
            Some(AggregationIntent::ManagerBreakdown)
        );
    }

    #[test]
    fn test_no_aggregation_sentinel() {
        assert_eq!(detect("clients from new york"), None);
        assert_eq!(detect("top clients by equity"), None);
    }

    #[test]
    fn test_pipeline_stage_lists() {
        let breakdown = AggregationIntent::ManagerBreakdown.pipeline_stages();
        assert_eq!(breakdown.len(), 4);
        assert!(breakdown[0].get("$match").is_some());
        assert!(breakdown[1].get("$group").is_some());
        assert_eq!(breakdown[2]["$sort"]["total_portfolio_value"], -1);
        assert!(breakdown[1]["$group"].get("manager_employee_id").is_none());

        let top = AggregationIntent::TopManagers.pipeline_stages();
        assert_eq!(top.len(), 5);
        assert_eq!(top[3]["$limit"], 10);
        assert!(top[1]["$group"].get("manager_employee_id").is_some());
    }
}
