//! Suffix-driven content normalization.
//!
//! Turns a possibly-compressed or archived payload into a single flat byte
//! buffer. The decision to attempt a stage comes from the URL suffix alone
//! ([`ContentKind`]); each stage then verifies against the actual bytes and
//! falls back gracefully when the suffix lies.

mod cleanup;
mod gzip;
mod zip;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use cleanup::remove_tree;

/// What the URL suffix claims the payload to be.
///
/// Classification is separate from verification: a candidate is only
/// decompressed or extracted after its byte signature (or archive header)
/// checks out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// No recognized suffix; content passes through untouched.
    Plain,
    /// URL ends in `.gz`; content may be a gzip stream.
    GzipCandidate,
    /// URL ends in `.zip`; content may be a zip archive.
    ZipCandidate,
}

impl ContentKind {
    /// Classifies a URL by its suffix.
    #[must_use]
    pub fn classify(url: &str) -> Self {
        if url.ends_with(".gz") {
            Self::GzipCandidate
        } else if url.ends_with(".zip") {
            Self::ZipCandidate
        } else {
            Self::Plain
        }
    }
}

/// Errors raised while normalizing fetched content.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A declared-valid archive contained no extractable files.
    #[error("zip archive at {path} is empty")]
    EmptyArchive {
        /// The staged archive path.
        path: PathBuf,
    },

    /// A real zip archive failed to extract.
    #[error("failed to extract zip archive at {path}: {message}")]
    Archive {
        /// The staged archive path.
        path: PathBuf,
        /// Description of the underlying archive error.
        message: String,
    },

    /// Content matched the gzip signature but did not inflate.
    #[error("failed to inflate gzip content from {url}: {source}")]
    Gzip {
        /// The URL the content came from.
        url: String,
        /// The underlying inflate error.
        #[source]
        source: std::io::Error,
    },

    /// Staging or cleanup IO failed.
    #[error("IO error during normalization at {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl NormalizeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Normalizes fetched content according to the URL suffix.
///
/// `destination` is the eventual output path; the zip stage derives its
/// staging paths (`-zipped` file, `-unzipped` directory) from it so
/// concurrent retrievals cannot collide.
///
/// For URLs with no recognized suffix this is the identity function.
///
/// # Errors
///
/// Returns [`NormalizeError`] when an archive claims to be valid but yields
/// zero extractable files, or when staging IO fails. A suffix that turns out
/// to be a lie is not an error; the content passes through unchanged.
pub fn normalize(
    url: &str,
    contents: Vec<u8>,
    destination: &Path,
) -> Result<Vec<u8>, NormalizeError> {
    match ContentKind::classify(url) {
        ContentKind::Plain => Ok(contents),
        ContentKind::GzipCandidate => gzip::inflate_if_gzip(url, contents),
        ContentKind::ZipCandidate => zip::extract_single_file(url, contents, destination),
    }
}
