use financial_query_api::{
    agent::QueryAgent,
    api::{start_server, ApiState},
    config::Config,
    gemini::GeminiClient,
    store::{DataApiStore, DocumentStore},
    tools::create_registry,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    info!("🚀 Financial Query Service - API Server");
    info!("📍 Port: {}", config.port);

    // Create components
    let store: Arc<dyn DocumentStore> = Arc::new(DataApiStore::new(
        config.document_api_url.clone(),
        config.document_api_key.clone(),
    )?);
    let registry = Arc::new(create_registry(&config, store.clone()));
    let client = GeminiClient::new(config.gemini_api_key.clone())?;
    let agent = Arc::new(QueryAgent::new(client, registry.clone()));

    let state = ApiState {
        agent,
        registry,
        store,
        gemini_configured: !config.gemini_api_key.is_empty(),
    };

    info!("✅ Query pipeline initialized");
    info!("📡 Starting API server...");

    // Start API server
    start_server(state, config.port).await?;

    Ok(())
}
