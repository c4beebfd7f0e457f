//! Flightdeck - caching, quota-enforcing flight-data proxy
//!
//! This is the main entry point for the Flightdeck proxy server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tracing::{debug, info, warn};

use flightdeck::{routes, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flightdeck=info,tower_http=info".into()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Flightdeck proxy");

    // Load configuration
    let config = Config::from_env()?;
    if config.aviationstack_api_key.is_none() {
        warn!("AVIATIONSTACK_API_KEY is not set; proxy endpoints will answer 500");
    }
    info!("Configuration loaded successfully");

    // Initialize metrics
    routes::metrics::init_metrics();
    info!("Metrics initialized");

    // Initialize application state
    let state = Arc::new(AppState::new(config.clone()).await?);
    let quota = state.proxy.quota().snapshot();
    routes::metrics::set_quota_used(quota.count);
    info!(
        month = %quota.month,
        used = quota.count,
        limit = quota.limit,
        provider = state.proxy.upstream().name(),
        usage_file = %config.usage_file.display(),
        "Month {}: used {}/{} calls",
        quota.month,
        quota.count,
        quota.limit
    );

    // Periodically drop expired responses that are never read again
    let sweeper = state.proxy.cache().clone();
    tokio::spawn(async move {
        let period = sweeper
            .ttl()
            .to_std()
            .unwrap_or_default()
            .max(std::time::Duration::from_secs(1));
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            let purged = sweeper.purge_expired();
            if purged > 0 {
                debug!(purged, remaining = sweeper.len(), "Purged expired responses");
            }
        }
    });

    // Build the router
    let app = routes::create_router(state.clone());

    // Bind to address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Listening on {}", addr);

    // Create listener
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Flightdeck shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating shutdown");
        }
    }
}
