//! API service configuration

use anyhow::{Context, Result};
use lapshare_client::ClientConfig;
use lapshare_settlement::SettlementConfig;

/// API service configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Service host
    pub host: String,
    /// Service port
    pub port: u16,
    /// Settlement policies
    pub settlement: SettlementConfig,
    /// Remote backend; the in-memory backend is used when absent
    pub backend: Option<ClientConfig>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8085,
            settlement: SettlementConfig::default(),
            backend: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        // Platform PORT first, LAPSHARE_PORT overrides it
        if let Ok(port) = std::env::var("PORT") {
            cfg.port = port.parse().context("PORT must be a port number")?;
        }
        if let Ok(host) = std::env::var("LAPSHARE_HOST") {
            cfg.host = host;
        }
        if let Ok(port) = std::env::var("LAPSHARE_PORT") {
            cfg.port = port.parse().context("LAPSHARE_PORT must be a port number")?;
        }

        cfg.settlement = SettlementConfig::load()?;
        cfg.backend = ClientConfig::load()?;

        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
