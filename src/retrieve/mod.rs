//! HTTP retrieval with retry and linear backoff.
//!
//! This module provides the [`FileRetriever`] orchestrator and the transport
//! layer underneath it. The transport performs a single buffered GET and
//! classifies the outcome; the orchestrator drives the attempt loop, then
//! hands the fetched bytes to normalization and transcoding before
//! persisting them.
//!
//! # Example
//!
//! ```no_run
//! use file_retriever::retrieve::{FileRetriever, RetrievalRequest};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let retriever = FileRetriever::new();
//! let request = RetrievalRequest::new("https://example.com/export.zip")
//!     .with_destination(PathBuf::from("./export.tsv"));
//! let retrieved = retriever.retrieve(request).await?;
//! println!("retrieved: {}", retrieved.local_path.display());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod retriever;
mod retry;

pub use client::{FetchSuccess, HttpTransport, Transport};
pub use constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_BACKOFF_UNIT, DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT,
};
pub use error::{FetchError, RetrieveError};
pub use retriever::{FileRetriever, RetrievalRequest, RetrievedFile};
pub use retry::{RetryDecision, RetryPolicy};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, RetrieveError>` explicitly in function signatures.
