//! Document store access
//!
//! The driver seam is the `DocumentStore` trait: the HTTP data-API client
//! talks to a real store, the in-memory implementation backs development
//! and tests. Filters and pipelines are built by `crate::query` and passed
//! through as literal documents.

use crate::models::ManagerRollup;
use crate::query::{AggregationIntent, DocumentFilter};
use crate::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod data_api;
pub use data_api::DataApiStore;

#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Query a collection by structured filter, capped at `limit` records.
    async fn find(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        limit: usize,
    ) -> Result<Vec<Value>>;

    /// Run one of the canned per-manager rollups over the clients collection.
    async fn aggregate_managers(&self, intent: AggregationIntent) -> Result<Vec<ManagerRollup>>;

    /// Liveness check.
    async fn ping(&self) -> Result<()>;

    /// Bulk insert (seeding only).
    async fn insert_many(&self, collection: &str, docs: &[Value]) -> Result<usize>;

    /// Delete every document in a collection (reseeding only).
    async fn clear(&self, collection: &str) -> Result<u64>;

    /// Attach a relationship manager to one client (enrichment pass).
    async fn assign_manager(
        &self,
        collection: &str,
        client_id: &str,
        manager: &Value,
    ) -> Result<bool>;
}

/// In-memory document store for development and tests.
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Vec<Value>>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        limit: usize,
    ) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        let docs = collections.get(collection).map(Vec::as_slice).unwrap_or(&[]);
        Ok(docs
            .iter()
            .filter(|doc| filter.matches(doc))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn aggregate_managers(&self, intent: AggregationIntent) -> Result<Vec<ManagerRollup>> {
        let collections = self.collections.read().await;
        let docs = collections.get("clients").map(Vec::as_slice).unwrap_or(&[]);

        let mut rollups: Vec<ManagerRollup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for doc in docs {
            let Some(manager) = doc.get("relationship_manager") else {
                continue;
            };
            let Some(name) = manager.get("name").and_then(Value::as_str) else {
                continue;
            };
            let account_value = doc.get("account_value").and_then(Value::as_f64).unwrap_or(0.0);

            let slot = *index.entry(name.to_string()).or_insert_with(|| {
                rollups.push(ManagerRollup {
                    relationship_manager: name.to_string(),
                    client_count: 0,
                    total_portfolio_value: 0.0,
                    avg_portfolio_value: 0.0,
                    manager_specialty: manager
                        .get("specialty")
                        .and_then(Value::as_str)
                        .map(String::from),
                    manager_employee_id: match intent {
                        AggregationIntent::TopManagers => manager
                            .get("employee_id")
                            .and_then(Value::as_str)
                            .map(String::from),
                        AggregationIntent::ManagerBreakdown => None,
                    },
                });
                rollups.len() - 1
            });

            let rollup = &mut rollups[slot];
            rollup.client_count += 1;
            rollup.total_portfolio_value += account_value;
        }

        for rollup in &mut rollups {
            if rollup.client_count > 0 {
                rollup.avg_portfolio_value =
                    rollup.total_portfolio_value / rollup.client_count as f64;
            }
        }

        rollups.sort_by(|a, b| {
            b.total_portfolio_value
                .partial_cmp(&a.total_portfolio_value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        if let Some(limit) = intent.limit() {
            rollups.truncate(limit);
        }

        Ok(rollups)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_many(&self, collection: &str, docs: &[Value]) -> Result<usize> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(docs.iter().cloned());
        Ok(docs.len())
    }

    async fn clear(&self, collection: &str) -> Result<u64> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .remove(collection)
            .map(|docs| docs.len() as u64)
            .unwrap_or(0))
    }

    async fn assign_manager(
        &self,
        collection: &str,
        client_id: &str,
        manager: &Value,
    ) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        for doc in docs.iter_mut() {
            if doc.get("client_id").and_then(Value::as_str) == Some(client_id) {
                doc["relationship_manager"] = manager.clone();
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{translate, Condition};
    use serde_json::json;

    fn client(name: &str, city: &str, value: f64, manager: Option<(&str, &str, &str)>) -> Value {
        let mut doc = json!({
            "client_id": format!("CLT-{}", name),
            "name": name,
            "age": 40,
            "address": { "city": city, "state": "XX" },
            "account_value": value,
        });
        if let Some((m_name, employee_id, specialty)) = manager {
            doc["relationship_manager"] = json!({
                "name": m_name,
                "employee_id": employee_id,
                "specialty": specialty,
            });
        }
        doc
    }

    async fn seeded_store() -> InMemoryDocumentStore {
        let store = InMemoryDocumentStore::new();
        let docs = vec![
            client("Ann Lee", "New York", 2_000_000.0, Some(("Sarah Johnson", "RM001", "High Net Worth"))),
            client("Bob Ray", "Boston", 500_000.0, Some(("Sarah Johnson", "RM001", "High Net Worth"))),
            client("Cal Poe", "New York", 750_000.0, Some(("Michael Chen", "RM002", "Corporate Clients"))),
            client("Dan Oak", "Seattle", 50_000.0, None),
        ];
        store.insert_many("clients", &docs).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_find_with_translated_filter() {
        let store = seeded_store().await;
        let filter = translate("clients from new york");
        let results = store.find("clients", &filter, 20).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_find_honors_limit() {
        let store = seeded_store().await;
        let results = store
            .find("clients", &DocumentFilter::new(), 2)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_aggregate_breakdown_sorted_desc() {
        let store = seeded_store().await;
        let rollups = store
            .aggregate_managers(AggregationIntent::ManagerBreakdown)
            .await
            .unwrap();

        assert_eq!(rollups.len(), 2);
        assert_eq!(rollups[0].relationship_manager, "Sarah Johnson");
        assert_eq!(rollups[0].client_count, 2);
        assert_eq!(rollups[0].total_portfolio_value, 2_500_000.0);
        assert_eq!(rollups[0].avg_portfolio_value, 1_250_000.0);
        // Breakdown omits the employee id; the unmanaged client is excluded.
        assert!(rollups[0].manager_employee_id.is_none());
    }

    #[tokio::test]
    async fn test_aggregate_top_managers_includes_employee_id() {
        let store = seeded_store().await;
        let rollups = store
            .aggregate_managers(AggregationIntent::TopManagers)
            .await
            .unwrap();
        assert_eq!(rollups[0].manager_employee_id.as_deref(), Some("RM001"));
    }

    #[tokio::test]
    async fn test_assign_manager_and_requery() {
        let store = seeded_store().await;
        let updated = store
            .assign_manager(
                "clients",
                "CLT-Dan Oak",
                &json!({ "name": "Lisa Thompson", "employee_id": "RM005", "specialty": "Estate Planning" }),
            )
            .await
            .unwrap();
        assert!(updated);

        let rollups = store
            .aggregate_managers(AggregationIntent::ManagerBreakdown)
            .await
            .unwrap();
        assert_eq!(rollups.len(), 3);
    }

    #[tokio::test]
    async fn test_clear_reports_deleted_count() {
        let store = seeded_store().await;
        assert_eq!(store.clear("clients").await.unwrap(), 4);
        let mut filter = DocumentFilter::new();
        filter.set("name", Condition::Contains("ann".into()));
        assert!(store.find("clients", &filter, 20).await.unwrap().is_empty());
    }
}
