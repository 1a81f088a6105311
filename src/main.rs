use market_scanner::api::{run_server, AppState};
use market_scanner::{AppConfig, Scanner};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    // Setup Logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Market Scanner...");

    // Load Configuration
    let config = AppConfig::load()?;
    info!(
        "Loaded Configuration: provider={}, news sources={:?}, fast_count={}, max_enriched={}",
        config.quote_provider, config.news.sources, config.scan.fast_count, config.scan.max_enriched
    );

    // Build the pipeline
    let scanner = Scanner::from_config(&config)?;
    info!("🔍 Universe loaded: {} tickers", scanner.universe().len());

    let app_state = Arc::new(AppState::new(scanner));

    // Start API Server
    info!("Initializing API Server...");
    run_server(app_state, &config.server.bind_addr).await?;

    Ok(())
}
