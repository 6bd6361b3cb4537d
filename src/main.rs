use fiend_scanner::{api, config::Config, state::AppState};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting fiend-scanner");

    // Load configuration
    let config = Config::from_env();
    tracing::info!(
        "Configuration loaded: scan TTL {:?}, price TTL {:?}, holders TTL {:?}, high-water mark {}",
        config.scan_cache_ttl,
        config.price_cache_ttl,
        config.holders_cache_ttl,
        config.cache_high_water_mark
    );
    if config.neynar_api_key.is_none() {
        tracing::warn!("NEYNAR_API_KEY is not set; scans will fail until it is configured");
    }
    if config.alchemy_api_key.is_none() {
        tracing::warn!("ALCHEMY_API_KEY is not set; NFT and price lookups will fail until it is configured");
    }

    // Create shared state
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let app_state = Arc::new(AppState::from_config(config)?);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        signal_token.cancel();
    });

    // Start HTTP server
    let app = api::create_router(app_state);
    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
