use financial_query_api::{
    config::Config,
    seed::seed_clients,
    store::DataApiStore,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    info!("🔧 Seeding sample client data");

    let store = DataApiStore::new(
        config.document_api_url.clone(),
        config.document_api_key.clone(),
    )?;

    let inserted = seed_clients(&store).await?;

    info!("🎉 Seeded {} clients with relationship managers", inserted);

    Ok(())
}
