//! Tool trait and registry
//!
//! Tools are deterministic operations the agent loop can invoke by name.
//! The document tool answers client questions against the document store;
//! the SQL tool runs read-only queries against the market data warehouse.

use crate::config::Config;
use crate::error::QueryServiceError;
use crate::format::tuples::{render_tuple_dump, SqlValue};
use crate::query::{aggregation, collection, translate};
use crate::render::{render_manager_rollups, render_records};
use crate::store::DocumentStore;
use crate::Result;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Row, TypeInfo};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Cap on records a single tool call will pull back.
pub const RESULT_CAP: usize = 20;

/// Trait for a single tool (deterministic execution)
#[async_trait::async_trait]
pub trait QueryTool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    async fn call(&self, input: &str) -> Result<String>;
}

/// Tool registry for looking up and executing tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn QueryTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn QueryTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn QueryTool>> {
        self.tools.get(name).cloned()
    }

    pub fn list(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the registry for a deployment. The SQL tool is registered only
/// when a warehouse URL is configured.
pub fn create_registry(config: &Config, store: Arc<dyn DocumentStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(DocumentQueryTool::new(store)));
    if let Some(url) = config.mysql_url.clone() {
        registry.register(Arc::new(SqlQueryTool::new(url)));
    } else {
        info!("MYSQL_URL not set, sql_query tool disabled");
    }
    registry
}

/// Answers natural-language client questions against the document store.
pub struct DocumentQueryTool {
    store: Arc<dyn DocumentStore>,
}

impl DocumentQueryTool {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl QueryTool for DocumentQueryTool {
    fn name(&self) -> &'static str {
        "document_query"
    }

    fn description(&self) -> &'static str {
        "Query client records by natural language: filters on city, age, \
         risk tolerance, sector and portfolio value, plus relationship \
         manager rollups."
    }

    async fn call(&self, input: &str) -> Result<String> {
        // Store failures become observations, not hard errors, so the
        // agent loop can surface them in its next step.
        if let Some(intent) = aggregation::detect(input) {
            debug!(?intent, "running manager aggregation");
            return match self.store.aggregate_managers(intent).await {
                Ok(rollups) => Ok(render_manager_rollups(&rollups, intent)),
                Err(e) => {
                    warn!(error = %e, "manager aggregation failed");
                    Ok(format!("Error aggregating managers: {e}"))
                }
            };
        }

        let filter = translate(input);
        let target = collection::select(input);
        debug!(collection = target.name(), clauses = filter.clauses().len(), "running find");
        match self.store.find(target.name(), &filter, RESULT_CAP).await {
            Ok(records) => Ok(render_records(&records)),
            Err(e) => {
                warn!(error = %e, "document query failed");
                Ok(format!("Error querying records: {e}"))
            }
        }
    }
}

/// Runs read-only SQL against the market data warehouse. The pool is
/// created lazily on first use so deployments without a warehouse never
/// open a connection.
pub struct SqlQueryTool {
    url: String,
    pool: OnceCell<MySqlPool>,
}

impl SqlQueryTool {
    pub fn new(url: String) -> Self {
        Self {
            url,
            pool: OnceCell::new(),
        }
    }

    async fn pool(&self) -> Result<&MySqlPool> {
        self.pool
            .get_or_try_init(|| async {
                let pool = MySqlPoolOptions::new()
                    .max_connections(8)
                    .idle_timeout(Duration::from_secs(60))
                    .acquire_timeout(Duration::from_secs(30))
                    .connect(&self.url)
                    .await?;
                info!("connected to market data warehouse");
                Ok::<_, QueryServiceError>(pool)
            })
            .await
    }

    fn decode_row(row: &MySqlRow) -> Result<Vec<SqlValue>> {
        let mut values = Vec::with_capacity(row.columns().len());
        for (i, column) in row.columns().iter().enumerate() {
            let type_name = column.type_info().name();
            let value = match type_name {
                "DECIMAL" | "NEWDECIMAL" => row
                    .try_get::<Option<BigDecimal>, _>(i)?
                    .map(|d| SqlValue::Decimal(d.to_string()))
                    .unwrap_or(SqlValue::Null),
                "DATE" => row
                    .try_get::<Option<NaiveDate>, _>(i)?
                    .map(SqlValue::Date)
                    .unwrap_or(SqlValue::Null),
                "DATETIME" | "TIMESTAMP" => row
                    .try_get::<Option<NaiveDateTime>, _>(i)?
                    .map(SqlValue::DateTime)
                    .unwrap_or(SqlValue::Null),
                "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => row
                    .try_get::<Option<i64>, _>(i)?
                    .map(SqlValue::Int)
                    .unwrap_or(SqlValue::Null),
                "FLOAT" | "DOUBLE" => row
                    .try_get::<Option<f64>, _>(i)?
                    .map(SqlValue::Float)
                    .unwrap_or(SqlValue::Null),
                _ => row
                    .try_get::<Option<String>, _>(i)?
                    .map(SqlValue::Text)
                    .unwrap_or(SqlValue::Null),
            };
            values.push(value);
        }
        Ok(values)
    }
}

#[async_trait::async_trait]
impl QueryTool for SqlQueryTool {
    fn name(&self) -> &'static str {
        "sql_query"
    }

    fn description(&self) -> &'static str {
        "Run a read-only SELECT statement against the market data \
         warehouse (securities, daily prices, portfolio performance)."
    }

    async fn call(&self, input: &str) -> Result<String> {
        let sql = input.trim();
        if !sql.to_lowercase().starts_with("select") {
            return Err(QueryServiceError::InvalidToolInput(
                "sql_query only accepts SELECT statements".to_string(),
            ));
        }

        let pool = self.pool().await?;
        let rows = sqlx::query(sql).fetch_all(pool).await?;
        let decoded: Vec<Vec<SqlValue>> = rows
            .iter()
            .map(Self::decode_row)
            .collect::<Result<_>>()?;

        debug!(rows = decoded.len(), "sql query complete");
        Ok(format!(
            "Query returned {} row(s):\n{}",
            decoded.len(),
            render_tuple_dump(&decoded)
        ))
    }
}
