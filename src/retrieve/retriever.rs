//! Retrieval orchestrator: attempt loop, normalization, persistence.
//!
//! [`FileRetriever`] drives the whole pipeline for one request: fetch with
//! retry and linear backoff, normalize the payload (gzip/zip), transcode to
//! UTF-8, write the result to disk, and report metadata about what was
//! written.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::client::{FetchSuccess, HttpTransport, Transport};
use super::constants::{DEFAULT_BACKOFF_UNIT, DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT};
use super::error::RetrieveError;
use super::retry::{RetryDecision, RetryPolicy};
use crate::encoding::{self, FileEncoding};
use crate::normalize;

/// A single retrieval job, built by the caller and handed to
/// [`FileRetriever::retrieve`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalRequest {
    /// Source URL.
    pub url: String,
    /// Target path; when absent a unique path under the system temp
    /// directory is synthesized.
    pub destination: Option<PathBuf>,
    /// Declared encoding of the fetched content. Trusted, never detected.
    pub input_encoding: FileEncoding,
    /// Maximum fetch attempts (at least 1).
    pub max_attempts: u32,
    /// Base wait between retries; the sleep after attempt `n` is `n` times this.
    pub backoff_unit: Duration,
    /// Per-attempt transport timeout.
    pub request_timeout: Duration,
}

impl RetrievalRequest {
    /// Creates a request for `url` with the default attempt count, backoff
    /// unit, and timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            destination: None,
            input_encoding: FileEncoding::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets an explicit destination path.
    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Declares the encoding of the remote content.
    #[must_use]
    pub fn with_input_encoding(mut self, encoding: FileEncoding) -> Self {
        self.input_encoding = encoding;
        self
    }

    /// Sets the maximum number of fetch attempts (clamped to at least 1).
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the backoff unit used between retries.
    #[must_use]
    pub fn with_backoff_unit(mut self, backoff_unit: Duration) -> Self {
        self.backoff_unit = backoff_unit;
        self
    }

    /// Sets the per-attempt transport timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

/// Metadata about a successfully retrieved and persisted file.
///
/// Constructed exactly once, after the final bytes have been written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedFile {
    /// The URL the content was retrieved from.
    pub url: String,
    /// Absolute path the final bytes were written to.
    pub local_path: PathBuf,
    /// Remote last-modified timestamp, when the server reported one.
    pub last_modified: Option<SystemTime>,
    /// Byte length of the final (normalized, transcoded) content.
    pub len: u64,
}

/// Orchestrates retrieval: fetch with retry, normalize, transcode, persist.
///
/// Holds no per-request state; one instance can serve many concurrent
/// retrievals, each owning its own staging files.
#[derive(Clone)]
pub struct FileRetriever {
    transport: Arc<dyn Transport>,
}

impl Default for FileRetriever {
    fn default() -> Self {
        Self::new()
    }
}

impl FileRetriever {
    /// Creates a retriever backed by the production HTTP transport.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transport: Arc::new(HttpTransport::new()),
        }
    }

    /// Creates a retriever with a custom transport (used by tests and
    /// callers that need to interpose on fetches).
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Retrieves the file at `request.url`, normalizes and transcodes it,
    /// and writes the result to the destination path.
    ///
    /// # Errors
    ///
    /// - [`RetrieveError::InvalidUrl`] if the URL does not parse.
    /// - [`RetrieveError::Exhausted`] when every fetch attempt failed;
    ///   carries the last attempt's classified failure.
    /// - [`RetrieveError::Normalize`] when a declared archive yields no
    ///   extractable file or staging IO fails. Never retried.
    /// - [`RetrieveError::Io`] when persisting the final bytes fails.
    ///   Never retried.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn retrieve(&self, request: RetrievalRequest) -> Result<RetrievedFile, RetrieveError> {
        debug!("will copy file from remote to local disk now");

        Url::parse(&request.url).map_err(|_| RetrieveError::invalid_url(&request.url))?;

        let destination = request
            .destination
            .clone()
            .unwrap_or_else(synthesize_destination);

        let FetchSuccess {
            body,
            last_modified,
        } = self.fetch_with_retry(&request).await?;

        // Zip staging and extraction are blocking filesystem work; keep them
        // off the runtime threads.
        let contents = {
            let url = request.url.clone();
            let staging = destination.clone();
            tokio::task::spawn_blocking(move || normalize::normalize(&url, body, &staging))
                .await
                .map_err(|e| RetrieveError::io(&destination, std::io::Error::other(e)))??
        };
        let contents = encoding::transcode(contents, request.input_encoding);

        tokio::fs::write(&destination, &contents)
            .await
            .map_err(|e| RetrieveError::io(&destination, e))?;

        let local_path =
            std::path::absolute(&destination).map_err(|e| RetrieveError::io(&destination, e))?;

        debug!(
            path = %local_path.display(),
            bytes = contents.len(),
            "retrieved and prepared file for further processing"
        );

        Ok(RetrievedFile {
            url: request.url,
            local_path,
            last_modified,
            len: contents.len() as u64,
        })
    }

    /// Runs the attempt loop around the transport.
    ///
    /// Failed attempts are logged at `info` on the first attempt and `warn`
    /// afterwards, to keep transient blips from flooding the logs.
    async fn fetch_with_retry(
        &self,
        request: &RetrievalRequest,
    ) -> Result<FetchSuccess, RetrieveError> {
        let policy = RetryPolicy::new(request.max_attempts, request.backoff_unit);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(attempt, "attempting fetch");

            match self
                .transport
                .fetch(&request.url, request.request_timeout)
                .await
            {
                Ok(success) => return Ok(success),
                Err(e) => {
                    if attempt == 1 {
                        info!(url = %request.url, attempt, error = %e, "fetch attempt failed");
                    } else {
                        warn!(url = %request.url, attempt, error = %e, "fetch attempt failed");
                    }

                    match policy.should_retry(attempt) {
                        RetryDecision::Retry {
                            delay,
                            attempt: next_attempt,
                        } => {
                            debug!(
                                url = %request.url,
                                attempt = next_attempt,
                                max_attempts = policy.max_attempts(),
                                delay_ms = delay.as_millis(),
                                "retrying fetch"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        RetryDecision::GiveUp => {
                            return Err(RetrieveError::exhausted(&request.url, attempt, e));
                        }
                    }
                }
            }
        }
    }
}

/// Synthesizes a destination path unique to this call, derived from the
/// current high-resolution time.
fn synthesize_destination() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!("retrieved-{nanos}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_match_constants() {
        let request = RetrievalRequest::new("https://example.com/data.tsv");
        assert_eq!(request.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(request.backoff_unit, DEFAULT_BACKOFF_UNIT);
        assert_eq!(request.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(request.input_encoding, FileEncoding::Utf8);
        assert!(request.destination.is_none());
    }

    #[test]
    fn test_request_builder_setters() {
        let request = RetrievalRequest::new("https://example.com/data.tsv")
            .with_destination("/tmp/data.tsv")
            .with_input_encoding(FileEncoding::Windows1252)
            .with_max_attempts(7)
            .with_backoff_unit(Duration::from_millis(50))
            .with_request_timeout(Duration::from_secs(10));

        assert_eq!(request.destination, Some(PathBuf::from("/tmp/data.tsv")));
        assert_eq!(request.input_encoding, FileEncoding::Windows1252);
        assert_eq!(request.max_attempts, 7);
        assert_eq!(request.backoff_unit, Duration::from_millis(50));
        assert_eq!(request.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_request_max_attempts_clamped_to_one() {
        let request = RetrievalRequest::new("https://example.com/data.tsv").with_max_attempts(0);
        assert_eq!(request.max_attempts, 1);
    }

    #[test]
    fn test_synthesized_destinations_are_unique() {
        let a = synthesize_destination();
        let b = synthesize_destination();
        assert_ne!(a, b);
        assert!(!a.exists());
    }

    #[tokio::test]
    async fn test_retrieve_rejects_invalid_url() {
        let retriever = FileRetriever::new();
        let result = retriever
            .retrieve(RetrievalRequest::new("not-a-url"))
            .await;
        assert!(matches!(result, Err(RetrieveError::InvalidUrl { .. })));
    }
}
