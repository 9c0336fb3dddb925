//! HTTP transport for fetching file contents.
//!
//! This module provides the [`Transport`] trait, which performs one buffered
//! GET and classifies the outcome, and [`HttpTransport`], the production
//! implementation over `reqwest`. Transport-level gzip (`Accept-Encoding`)
//! and redirect following are handled transparently here; content-level
//! `.gz`/`.zip` payloads are the normalizer's concern.

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::LAST_MODIFIED;
use tracing::{debug, instrument};

use super::constants::CONNECT_TIMEOUT_SECS;
use super::error::FetchError;

/// HTTP statuses classified as failed fetches. Anything else with a
/// non-empty body counts as success.
const FAILURE_STATUSES: [u16; 2] = [403, 404];

/// Successful outcome of a single fetch attempt.
#[derive(Debug, Clone)]
pub struct FetchSuccess {
    /// The full response body.
    pub body: Vec<u8>,
    /// Remote last-modified timestamp, when the server reported one.
    pub last_modified: Option<SystemTime>,
}

/// A capability that performs one HTTP GET and classifies the outcome.
///
/// The retry loop in [`FileRetriever`](crate::FileRetriever) is written
/// against this trait so it can be exercised with scripted transports in
/// tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches the full body at `url`, bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FetchError`]; every variant is retryable.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchSuccess, FetchError>;
}

/// HTTP transport backed by a pooled `reqwest` client.
///
/// Designed to be created once and reused across retrievals. Redirects are
/// followed automatically and gzip transport encoding is requested and
/// decompressed transparently.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Creates a new transport with the default connect timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchSuccess, FetchError> {
        debug!("sending GET request");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(url, &e))?;

        let status = response.status().as_u16();
        if FAILURE_STATUSES.contains(&status) {
            return Err(FetchError::status(url, status));
        }

        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| httpdate::parse_http_date(value).ok());

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_reqwest_error(url, &e))?;

        if body.is_empty() {
            return Err(FetchError::empty_body(url));
        }

        debug!(
            bytes = body.len(),
            has_last_modified = last_modified.is_some(),
            "fetch succeeded"
        );

        Ok(FetchSuccess {
            body: body.to_vec(),
            last_modified,
        })
    }
}

/// Maps a reqwest error to a classified fetch failure.
fn classify_reqwest_error(url: &str, error: &reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::timeout(url)
    } else {
        FetchError::transport(url, error)
    }
}
