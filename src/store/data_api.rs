//! HTTP data-API client for the document store
//!
//! Speaks the JSON find/aggregate/insert/delete action endpoints of the
//! store's data API over a long-lived, pooled reqwest client. Before each
//! query the store is pinged; on a failed ping the client is rebuilt and
//! pinged once more — the only retry behavior in the system.

use crate::error::QueryServiceError;
use crate::models::ManagerRollup;
use crate::query::{AggregationIntent, DocumentFilter};
use crate::Result;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const CLIENTS_COLLECTION: &str = "clients";

pub struct DataApiStore {
    client: RwLock<Client>,
    base_url: String,
    api_key: Option<String>,
}

impl DataApiStore {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: RwLock::new(build_client()?),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn post_action(&self, action: &str, body: &Value) -> Result<Value> {
        let url = format!("{}/action/{}", self.base_url, action);
        let client = self.client.read().await.clone();

        let mut request = client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.header("api-key", key);
        }

        let response = request.send().await.map_err(|e| {
            QueryServiceError::StoreUnavailable(format!("{} request failed: {}", action, e))
        })?;

        let status = response.status();
        let payload: Value = response.json().await.map_err(|e| {
            QueryServiceError::StoreError(format!("invalid JSON from {}: {}", action, e))
        })?;

        if !status.is_success() {
            return Err(QueryServiceError::StoreError(format!(
                "{} returned {}: {}",
                action, status, payload
            )));
        }

        Ok(payload)
    }

    /// Ping-before-query with a single transparent reconnect.
    async fn ensure_alive(&self) -> Result<()> {
        if self.raw_ping().await.is_ok() {
            return Ok(());
        }

        warn!("Document store ping failed, reconnecting");
        {
            let mut client = self.client.write().await;
            *client = build_client()?;
        }

        self.raw_ping().await.map(|_| {
            info!("Document store connection re-established");
        })
    }

    async fn raw_ping(&self) -> Result<()> {
        self.post_action("ping", &json!({})).await.map(|_| ())
    }

    fn documents(payload: Value, action: &str) -> Result<Vec<Value>> {
        payload
            .get("documents")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| {
                QueryServiceError::StoreError(format!("{} response missing 'documents'", action))
            })
    }
}

#[async_trait::async_trait]
impl super::DocumentStore for DataApiStore {
    async fn find(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        limit: usize,
    ) -> Result<Vec<Value>> {
        self.ensure_alive().await?;

        let body = json!({
            "collection": collection,
            "filter": filter.to_document(),
            "limit": limit,
        });
        debug!(collection, "document find");

        let payload = self.post_action("find", &body).await?;
        Self::documents(payload, "find")
    }

    async fn aggregate_managers(&self, intent: AggregationIntent) -> Result<Vec<ManagerRollup>> {
        self.ensure_alive().await?;

        let body = json!({
            "collection": CLIENTS_COLLECTION,
            "pipeline": intent.pipeline_stages(),
        });
        debug!(?intent, "document aggregate");

        let payload = self.post_action("aggregate", &body).await?;
        Self::documents(payload, "aggregate")?
            .into_iter()
            .map(|doc| {
                serde_json::from_value(doc).map_err(|e| {
                    QueryServiceError::StoreError(format!("malformed rollup row: {}", e))
                })
            })
            .collect()
    }

    async fn ping(&self) -> Result<()> {
        self.raw_ping().await
    }

    async fn insert_many(&self, collection: &str, docs: &[Value]) -> Result<usize> {
        let body = json!({
            "collection": collection,
            "documents": docs,
        });
        let payload = self.post_action("insertMany", &body).await?;
        Ok(payload
            .get("insertedCount")
            .and_then(Value::as_u64)
            .unwrap_or(docs.len() as u64) as usize)
    }

    async fn clear(&self, collection: &str) -> Result<u64> {
        let body = json!({
            "collection": collection,
            "filter": {},
        });
        let payload = self.post_action("deleteMany", &body).await?;
        Ok(payload
            .get("deletedCount")
            .and_then(Value::as_u64)
            .unwrap_or(0))
    }

    async fn assign_manager(
        &self,
        collection: &str,
        client_id: &str,
        manager: &Value,
    ) -> Result<bool> {
        let body = json!({
            "collection": collection,
            "filter": { "client_id": client_id },
            "update": { "$set": { "relationship_manager": manager } },
        });
        let payload = self.post_action("updateOne", &body).await?;
        Ok(payload
            .get("modifiedCount")
            .and_then(Value::as_u64)
            .unwrap_or(0)
            > 0)
    }
}

fn build_client() -> Result<Client> {
    Client::builder()
        .pool_idle_timeout(Duration::from_secs(60))
        .pool_max_idle_per_host(8)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| QueryServiceError::StoreError(format!("failed to build HTTP client: {}", e)))
}
