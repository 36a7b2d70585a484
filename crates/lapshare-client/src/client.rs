//! HTTP plumbing for the marketplace backend

use lapshare_common::{LapshareError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;

/// REST client for the Contract, Deposit, Damage report, and Compensation services
#[derive(Clone)]
pub struct RestBackend {
    http: reqwest::Client,
    base_url: String,
}

impl RestBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| LapshareError::Config("Backend token is not a valid header".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| LapshareError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a single record; 404 maps to `None`
    pub(crate) async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = self.url(path);
        debug!(%url, "GET");

        let response = self.http.get(&url).send().await.map_err(transport_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_status(response).await?;
        let body = response.json::<T>().await.map_err(decode_error)?;
        Ok(Some(body))
    }

    /// GET a filtered collection and return its first record
    pub(crate) async fn get_first<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let url = self.url(path);
        debug!(%url, ?query, "GET");

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_status(response).await?;
        let records = response.json::<Vec<T>>().await.map_err(decode_error)?;
        Ok(records.into_iter().next())
    }

    /// POST a JSON body and decode the created record
    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "POST");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status(response).await?;
        response.json::<T>().await.map_err(decode_error)
    }
}

impl std::fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackend")
            .field("base_url", &self.base_url)
            .finish()
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), %message, "Backend returned an error");
    Err(status_error(status, message))
}

/// Map a non-success status to an error
pub(crate) fn status_error(status: StatusCode, message: String) -> LapshareError {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            LapshareError::Network(format!("{status}: {message}"))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LapshareError::Backend {
            status: status.as_u16(),
            message: if message.is_empty() {
                "Backend token rejected".to_string()
            } else {
                message
            },
        },
        _ => LapshareError::Backend {
            status: status.as_u16(),
            message,
        },
    }
}

fn transport_error(err: reqwest::Error) -> LapshareError {
    LapshareError::Network(err.to_string())
}

fn decode_error(err: reqwest::Error) -> LapshareError {
    LapshareError::Serialization(err.to_string())
}
