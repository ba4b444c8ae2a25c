//! Core data models for the financial query service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

impl RiskTolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTolerance::Low => "low",
            RiskTolerance::Medium => "medium",
            RiskTolerance::High => "high",
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//
// ================= Client Record =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskProfile {
    pub tolerance: RiskTolerance,
    pub score: u8,
    pub assessment_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentPreferences {
    pub preferred_sectors: Vec<String>,
    #[serde(rename = "ESG_focused")]
    pub esg_focused: bool,
    pub international_exposure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipManager {
    pub name: String,
    pub employee_id: String,
    pub specialty: String,
    pub contact_email: String,
    pub assigned_date: Option<DateTime<Utc>>,
}

/// A client document as stored in the document store.
///
/// Created by the seeding routine; the relationship manager is attached
/// afterwards by a separate enrichment pass keyed on account-value tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub client_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: u32,
    pub address: Address,
    pub account_value: f64,
    pub risk_profile: RiskProfile,
    pub investment_preferences: InvestmentPreferences,
    pub created_date: DateTime<Utc>,
    pub last_contact: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_manager: Option<RelationshipManager>,
}

impl ClientRecord {
    /// The document-store representation of this record.
    pub fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

//
// ================= Aggregation =================
//

/// One row of the per-manager rollup: group clients by relationship-manager
/// name, carrying count, sum and average of `account_value` plus one sampled
/// specialty / employee id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerRollup {
    pub relationship_manager: String,
    pub client_count: u64,
    pub total_portfolio_value: f64,
    pub avg_portfolio_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_employee_id: Option<String>,
}

//
// ================= Response Payload =================
//

/// The typed payload returned to the frontend.
///
/// `kind` is one of "text", "table" or "chart"; `data` is the matching
/// shape (string, row list, or chart object). Table rows and chart points
/// are non-empty whenever the kind says so — the formatter falls back to
/// a weaker kind instead of emitting an empty one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
    #[serde(default)]
    pub metadata: Value,
}

impl QueryResponse {
    pub fn text(body: impl Into<String>, metadata: Value) -> Self {
        Self {
            kind: "text".to_string(),
            data: Value::String(body.into()),
            metadata,
        }
    }
}
