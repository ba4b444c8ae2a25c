//! Environment configuration
//!
//! Missing or malformed credentials are fatal at startup: the process
//! refuses to serve rather than limping along with a broken store.
//! The MySQL URL is the only optional piece; without it the relational
//! query tool is simply not registered.

use crate::error::QueryServiceError;
use crate::Result;

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub document_api_url: String,
    pub document_api_key: Option<String>,
    pub mysql_url: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let gemini_api_key = require_nonempty("GEMINI_API_KEY")?;

        let document_api_url = require_nonempty("DOCUMENT_API_URL").and_then(|url| {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(QueryServiceError::ConfigError(
                    "DOCUMENT_API_URL must start with http:// or https://".to_string(),
                ));
            }
            Ok(url.trim_end_matches('/').to_string())
        })?;

        let document_api_key = std::env::var("DOCUMENT_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let mysql_url = std::env::var("MYSQL_URL")
            .or_else(|_| std::env::var("MYSQL_URI"))
            .ok()
            .filter(|s| !s.trim().is_empty());
        if mysql_url.is_none() {
            tracing::warn!("MYSQL_URL not configured, SQL query tool will be disabled");
        }

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|_| {
                QueryServiceError::ConfigError("PORT must be a valid port number".to_string())
            })?;

        let config = Self {
            gemini_api_key,
            document_api_url,
            document_api_key,
            mysql_url,
            port,
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Document API URL: {}", config.document_api_url);
        tracing::debug!("Server port: {}", config.port);

        Ok(config)
    }

    pub fn mysql_configured(&self) -> bool {
        self.mysql_url.is_some()
    }
}

fn require_nonempty(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| {
            QueryServiceError::ConfigError(format!("{} environment variable is required", name))
        })
        .and_then(|value| {
            if value.trim().is_empty() {
                Err(QueryServiceError::ConfigError(format!(
                    "{} cannot be empty",
                    name
                )))
            } else {
                Ok(value)
            }
        })
}
