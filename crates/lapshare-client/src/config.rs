//! Backend client configuration

use std::time::Duration;

use lapshare_common::{LapshareError, Result};
use serde::{Deserialize, Serialize};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the marketplace backend
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL, e.g. `https://api.lapshare.vn/api`
    pub base_url: String,
    /// Bearer token issued by the backend
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load from environment; `None` when no backend URL is configured
    pub fn load() -> Result<Option<Self>> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(base_url) = lookup("LAPSHARE_BACKEND_URL").filter(|url| !url.trim().is_empty())
        else {
            return Ok(None);
        };

        let mut cfg = Self::new(base_url.trim());
        cfg.token = lookup("LAPSHARE_BACKEND_TOKEN").filter(|t| !t.is_empty());

        if let Some(val) = lookup("LAPSHARE_BACKEND_TIMEOUT_SECS") {
            cfg.timeout_secs = val.parse().map_err(|_| {
                LapshareError::Config(format!(
                    "LAPSHARE_BACKEND_TIMEOUT_SECS must be a number of seconds, got {val:?}"
                ))
            })?;
        }

        Ok(Some(cfg))
    }
}

// Keep the token out of logs
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
