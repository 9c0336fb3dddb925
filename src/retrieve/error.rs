//! Error types for the retrieve module.
//!
//! [`FetchError`] classifies a single transport attempt; every variant is
//! retryable and only the last one surfaces to the caller, wrapped in
//! [`RetrieveError::Exhausted`]. Failures outside the attempt loop
//! (normalization, persistence) get their own variants and are never
//! retried.

use std::path::PathBuf;

use thiserror::Error;

use crate::normalize::NormalizeError;

/// Classified outcome of one failed fetch attempt.
///
/// Carries the URL and enough detail to diagnose the failing condition from
/// logs without re-fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a status code we treat as a failed fetch
    /// (403 or 404).
    #[error("got {status} when retrieving file contents from {url}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Request timed out before completion.
    #[error("timeout retrieving file contents from {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Transport-level error (DNS resolution, connection refused, TLS, etc.)
    #[error("got transport error when retrieving file contents from {url}: {message}")]
    Transport {
        /// The URL that failed.
        url: String,
        /// Description of the underlying transport error.
        message: String,
    },

    /// The server answered successfully but the body was empty.
    #[error("got empty file when retrieving file contents from {url}")]
    EmptyBody {
        /// The URL that returned no content.
        url: String,
    },
}

impl FetchError {
    /// Creates a bad-status error.
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a transport error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: &reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            message: source.to_string(),
        }
    }

    /// Creates an empty-body error.
    pub fn empty_body(url: impl Into<String>) -> Self {
        Self::EmptyBody { url: url.into() }
    }

    /// Returns the URL the failed attempt was for.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Timeout { url }
            | Self::Transport { url, .. }
            | Self::EmptyBody { url } => url,
        }
    }
}

/// Errors surfaced to callers of [`FileRetriever::retrieve`](crate::FileRetriever::retrieve).
#[derive(Debug, Error)]
pub enum RetrieveError {
    /// All fetch attempts failed; carries the last attempt's classified failure.
    #[error("giving up on {url} after {attempts} attempts: {source}")]
    Exhausted {
        /// The URL that could not be retrieved.
        url: String,
        /// How many attempts were made.
        attempts: u32,
        /// The final attempt's failure.
        #[source]
        source: FetchError,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// File system error writing the final content.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Content normalization failed (archive extraction, staging IO).
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl RetrieveError {
    /// Creates an exhausted-attempts error.
    pub fn exhausted(url: impl Into<String>, attempts: u32, source: FetchError) -> Self {
        Self::Exhausted {
            url: url.into(),
            attempts,
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// Note on From trait implementations:
// We intentionally do NOT implement `From<reqwest::Error>` or
// `From<std::io::Error>` because the variants require context (url, path)
// that the source errors don't provide. The helper constructors are the
// correct pattern here as they allow callers to provide that context.
