//! File Retriever Library
//!
//! This library retrieves a remote file over HTTP(S), normalizes its content
//! (gzip decompression and zip extraction when the URL calls for them,
//! transcoding to UTF-8), writes the result to local storage, and returns
//! metadata about what was written.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`retrieve`] - HTTP transport, retry loop, and the retrieval orchestrator
//! - [`normalize`] - Suffix-driven gzip/zip content normalization
//! - [`encoding`] - Character-encoding transcoding to canonical UTF-8
//!
//! # Example
//!
//! ```no_run
//! use file_retriever::{FileRetriever, RetrievalRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let retriever = FileRetriever::new();
//! let request = RetrievalRequest::new("https://example.com/data.tsv.gz");
//! let retrieved = retriever.retrieve(request).await?;
//! println!("wrote {} bytes to {}", retrieved.len, retrieved.local_path.display());
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod encoding;
pub mod normalize;
pub mod retrieve;

// Re-export commonly used types
pub use encoding::{FileEncoding, transcode};
pub use normalize::{ContentKind, NormalizeError, normalize, remove_tree};
pub use retrieve::{
    DEFAULT_MAX_ATTEMPTS, FetchError, FetchSuccess, FileRetriever, HttpTransport,
    RetrievalRequest, RetrieveError, RetrievedFile, RetryDecision, RetryPolicy, Transport,
};
