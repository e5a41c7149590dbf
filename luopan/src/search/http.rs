//! HTTP client abstraction for testability

use std::future::Future;
use std::time::Duration;

use super::types::SearchError;

/// User agent sent with every request. Overpass rejects anonymous clients.
const USER_AGENT: &str = concat!("luopan/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Async HTTP GET.
///
/// Lets providers be tested with a canned response instead of the network.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request and returns the response body.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, SearchError>> + Send;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a client with the default timeout.
    pub fn new() -> Result<Self, SearchError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SearchError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, SearchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SearchError::Http(format!(
                "HTTP {} from {}",
                response.status(),
                redact(url)
            )));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| SearchError::Http(format!("Failed to read response: {}", e)))
    }
}

/// Strip the query string so API keys stay out of error messages.
fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
