//! HTTP client for the VITA worker API.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, warn};

/// Errors raised while talking to the worker.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("API error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Invalid JSON from worker: {0}")]
    Decode(#[from] serde_json::Error),

    /// Well-formed JSON that lacks a collection the tool reads.
    #[error("Unexpected response from worker: {0}")]
    UnexpectedShape(serde_json::Error),

    #[error("Request to worker failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid worker URL: {0}")]
    InvalidUrl(String),
}

/// Read-only access to the health analytics backend.
///
/// Every call is a fresh round trip: no retries and no caching.
#[async_trait]
pub trait HealthBackend: Send + Sync {
    /// GET `path` relative to the backend base URL and decode the JSON body.
    ///
    /// Query parameters with an empty value are not sent.
    async fn fetch(&self, path: &str, params: &[(&str, String)]) -> Result<Value, WorkerError>;
}

/// reqwest-backed [`HealthBackend`] for the VITA worker.
#[derive(Clone, Debug)]
pub struct WorkerClient {
    base_url: Url,
    client: Client,
}

impl WorkerClient {
    pub fn new(base_url: &str) -> Result<Self, WorkerError> {
        let base_url =
            Url::parse(base_url).map_err(|e| WorkerError::InvalidUrl(format!("{base_url}: {e}")))?;
        Ok(Self {
            base_url,
            client: Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the request URL for `path` with the non-empty `params` attached.
    pub fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, WorkerError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| WorkerError::InvalidUrl(format!("{path}: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params.iter().filter(|(_, v)| !v.is_empty()) {
                query.append_pair(key, value);
            }
        }
        // An empty serializer still leaves a trailing '?'
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }
}

#[async_trait]
impl HealthBackend for WorkerClient {
    async fn fetch(&self, path: &str, params: &[(&str, String)]) -> Result<Value, WorkerError> {
        let url = self.url(path, params)?;
        debug!("Worker: GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Worker: failed to read {} error body: {}", path, e);
                    String::new()
                }
            };
            warn!("Worker: {} returned {}", path, status);
            return Err(WorkerError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
