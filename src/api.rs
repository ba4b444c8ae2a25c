//! REST API server
//!
//! Exposes the question-answering pipeline over HTTP. A small table of
//! bypass rules routes well-known question shapes straight to a tool,
//! skipping the agent loop entirely; everything else goes through the
//! bounded agent.

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agent::QueryAgent;
use crate::error::QueryServiceError;
use crate::format::ResponseFormatter;
use crate::models::QueryResponse;
use crate::store::DocumentStore;
use crate::tools::ToolRegistry;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<QueryAgent>,
    pub registry: Arc<ToolRegistry>,
    pub store: Arc<dyn DocumentStore>,
    pub gemini_configured: bool,
}

/// =============================
/// Bypass Rules
/// =============================

/// Where a bypassed question is routed.
enum BypassRoute {
    /// Feed the question to the document tool as-is.
    Document,
    /// Run a canned SQL statement through the sql tool.
    Sql(&'static str),
}

struct BypassRule {
    matches: fn(&str) -> bool,
    route: BypassRoute,
}

const TOP_EQUITY_SQL: &str = "SELECT c.name, p.total_value \
     FROM clients c JOIN portfolios p ON p.client_id = c.id \
     WHERE p.asset_class = 'equity' \
     ORDER BY p.total_value DESC LIMIT 10";

const BEST_PERFORMANCE_SQL: &str = "SELECT security_id, open_price, close_price, volume \
     FROM market_data \
     ORDER BY (close_price - open_price) / open_price DESC LIMIT 10";

/// Checked in order against the lowercased question; first match wins.
const BYPASS_RULES: &[BypassRule] = &[
    BypassRule {
        matches: |q| q.contains("clients from new york"),
        route: BypassRoute::Document,
    },
    BypassRule {
        matches: |q| q.contains("age") && q.contains("distribution"),
        route: BypassRoute::Document,
    },
    BypassRule {
        matches: |q| {
            q.contains("top") && (q.contains("client") || q.contains("portfolio")) && q.contains("equity")
        },
        route: BypassRoute::Sql(TOP_EQUITY_SQL),
    },
    BypassRule {
        matches: |q| q.contains("best performance"),
        route: BypassRoute::Sql(BEST_PERFORMANCE_SQL),
    },
];

fn match_bypass(question: &str) -> Option<&'static BypassRoute> {
    let q = question.to_lowercase();
    BYPASS_RULES
        .iter()
        .find(|rule| (rule.matches)(&q))
        .map(|rule| &rule.route)
}

/// =============================
/// Ask Endpoint
/// =============================

async fn ask(
    State(state): State<ApiState>,
    Json(req): Json<AskRequest>,
) -> (StatusCode, Json<Value>) {
    let question = req.question.trim().to_string();
    if question.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Question must not be empty"})),
        );
    }

    let request_id = Uuid::new_v4();
    info!(%request_id, question = %question, "received question");

    if let Some(route) = match_bypass(&question) {
        return run_bypass(&state, &question, route, request_id).await;
    }

    match state.agent.run(&question).await {
        Ok(answer) => {
            let mut response = ResponseFormatter::format(&question, &answer);
            tag_request(&mut response, request_id);
            (StatusCode::OK, Json(json!(response)))
        }
        Err(QueryServiceError::AgentIterationLimit(reason)) => {
            warn!(%request_id, %reason, "agent hit iteration limit");
            let mut response = QueryResponse::text(
                "I wasn't able to finish that question within my step limit. \
                 Try a narrower question, for example: 'show clients from new york'.",
                json!({"question": question, "error": "iteration_limit"}),
            );
            tag_request(&mut response, request_id);
            (StatusCode::OK, Json(json!(response)))
        }
        Err(QueryServiceError::AgentOutputFormat(_)) => {
            warn!(%request_id, "agent output was unparseable");
            let mut response = QueryResponse::text(
                "I had trouble interpreting the reasoning for that question. \
                 Please rephrase it and try again.",
                json!({"question": question, "error": "invalid_output_format"}),
            );
            tag_request(&mut response, request_id);
            (StatusCode::OK, Json(json!(response)))
        }
        Err(e) => {
            warn!(%request_id, error = %e, "question failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": e.to_string()})),
            )
        }
    }
}

async fn run_bypass(
    state: &ApiState,
    question: &str,
    route: &BypassRoute,
    request_id: Uuid,
) -> (StatusCode, Json<Value>) {
    let (tool_name, input) = match route {
        BypassRoute::Document => ("document_query", question),
        BypassRoute::Sql(sql) => ("sql_query", *sql),
    };
    info!(%request_id, tool = tool_name, "bypassing agent");

    let Some(tool) = state.registry.get(tool_name) else {
        // Happens when a SQL bypass fires without a configured warehouse.
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": format!("tool {tool_name} is not available")})),
        );
    };

    match tool.call(input).await {
        Ok(output) => {
            let mut response = ResponseFormatter::format(question, &output);
            tag_request(&mut response, request_id);
            if let Value::Object(meta) = &mut response.metadata {
                meta.insert("bypass".to_string(), Value::String(tool_name.to_string()));
            }
            (StatusCode::OK, Json(json!(response)))
        }
        Err(e) => {
            warn!(%request_id, error = %e, "bypass tool failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": e.to_string()})),
            )
        }
    }
}

fn tag_request(response: &mut QueryResponse, request_id: Uuid) {
    if let Value::Object(meta) = &mut response.metadata {
        meta.insert(
            "request_id".to_string(),
            Value::String(request_id.to_string()),
        );
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health(State(state): State<ApiState>) -> Json<Value> {
    let store_ok = state.store.ping().await.is_ok();
    Json(json!({
        "status": if store_ok { "healthy" } else { "degraded" },
        "gemini_configured": state.gemini_configured,
        "document_store_configured": store_ok,
        "mysql_configured": state.registry.get("sql_query").is_some(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// =============================
/// Examples Endpoint
/// =============================

async fn examples() -> Json<Value> {
    Json(json!({
        "examples": [
            "Show me clients from New York",
            "Find clients aged between 30 and 40",
            "Which clients have high risk tolerance?",
            "List clients interested in technology",
            "Show portfolio value breakdown by relationship manager",
            "Who are the top 10 relationship managers?",
            "Show me top clients by equity holdings",
            "Which securities had the best performance?",
        ]
    }))
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/examples", get(examples))
        .route("/ask", post(ask))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(state: ApiState, port: u16) -> crate::Result<()> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bypass_rule_order() {
        assert!(matches!(
            match_bypass("Show me clients from New York"),
            Some(BypassRoute::Document)
        ));
        assert!(matches!(
            match_bypass("what is the age distribution"),
            Some(BypassRoute::Document)
        ));
        assert!(matches!(
            match_bypass("top clients by equity"),
            Some(BypassRoute::Sql(_))
        ));
        assert!(matches!(
            match_bypass("which security had the best performance"),
            Some(BypassRoute::Sql(_))
        ));
        assert!(match_bypass("tell me about bonds").is_none());
    }

    #[test]
    fn test_request_id_tagging() {
        let mut response = QueryResponse::text("hi", json!({"question": "q"}));
        let id = Uuid::new_v4();
        tag_request(&mut response, id);
        assert_eq!(response.metadata["request_id"], id.to_string());
    }
}
