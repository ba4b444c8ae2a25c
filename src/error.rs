//! Error types for the financial query service

use thiserror::Error;

/// Result type alias for query-service operations
pub type Result<T> = std::result::Result<T, QueryServiceError>;

#[derive(Error, Debug)]
pub enum QueryServiceError {

    // =============================
    // Configuration (fatal at startup)
    // =============================

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // Store Errors
    // =============================

    #[error("Document store unreachable: {0}")]
    StoreUnavailable(String),

    #[error("Document store error: {0}")]
    StoreError(String),

    // =============================
    // Agent Control Errors
    // =============================

    #[error("Agent stopped due to iteration limit: {0}")]
    AgentIterationLimit(String),

    #[error("Agent returned invalid output format: {0}")]
    AgentOutputFormat(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid tool input: {0}")]
    InvalidToolInput(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
