//! Lapshare API Service Binary
//!
//! Staff tooling endpoints for settling damage reports against deposits.

mod config;
mod error;
mod routes;

use std::sync::Arc;

use anyhow::Result;
use lapshare_client::RestBackend;
use lapshare_common::{MarketplaceBackend, VERSION};
use lapshare_settlement::{InMemoryBackend, SettlementService};
use prometheus::Registry;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ApiConfig;
use crate::routes::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting Lapshare API v{}", VERSION);

    // Load configuration
    let config = ApiConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let backend: Arc<dyn MarketplaceBackend> = match &config.backend {
        Some(client_config) => {
            info!(base_url = %client_config.base_url, "Using REST backend");
            Arc::new(RestBackend::new(client_config)?)
        }
        None => {
            warn!("LAPSHARE_BACKEND_URL not set, using empty in-memory backend");
            Arc::new(InMemoryBackend::with_policy(config.settlement.deposit))
        }
    };

    let service = SettlementService::new(backend, config.settlement.clone())?;
    let registry = Registry::new();
    service.metrics().register(&registry)?;

    let app = create_router(AppState {
        service: Arc::new(service),
        registry,
    });

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("REST API server started on {}", addr);

    // Start the server with graceful shutdown
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Shutting down Lapshare API");
    Ok(())
}
