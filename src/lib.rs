//! Financial Query Service
//!
//! Answers natural-language questions about a wealth-management client
//! book and a market-data warehouse:
//! - Translates questions into structured document-store filters
//! - Detects and runs per-manager aggregation rollups
//! - Routes well-known question shapes past the agent entirely
//! - Runs a bounded tool-use agent loop for everything else
//! - Shapes answers into typed text / table / chart payloads
//!
//! PIPELINE:
//! QUESTION → BYPASS? → TRANSLATE → QUERY → RENDER → CLASSIFY → FORMAT

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod gemini;
pub mod models;
pub mod query;
pub mod render;
pub mod seed;
pub mod store;
pub mod tools;

pub use error::{QueryServiceError, Result};

// Re-export common types
pub use models::*;
