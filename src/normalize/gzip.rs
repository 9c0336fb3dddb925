//! Content-level gzip stage.
//!
//! Distinct from the transport-level gzip the HTTP client negotiates: this
//! handles payloads that are gzip files in their own right (`.gz` suffix).

use std::io::Read;

use flate2::read::GzDecoder;
use tracing::{debug, info};

use super::NormalizeError;

/// Leading bytes of a gzip stream (magic number plus the deflate method byte).
const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// Inflates `contents` when it actually is a gzip stream.
///
/// The URL suffix got us here; the byte signature decides. Content that does
/// not carry the gzip magic passes through unchanged.
pub(super) fn inflate_if_gzip(url: &str, contents: Vec<u8>) -> Result<Vec<u8>, NormalizeError> {
    debug!(url, "got a file ending in .gz, trying to inflate");

    if !contents.starts_with(&GZIP_MAGIC) {
        info!(
            url,
            "skipped inflating: not a real gzip stream despite the .gz suffix"
        );
        return Ok(contents);
    }

    let mut inflated = Vec::new();
    GzDecoder::new(contents.as_slice())
        .read_to_end(&mut inflated)
        .map_err(|e| NormalizeError::Gzip {
            url: url.to_string(),
            source: e,
        })?;

    debug!(
        url,
        compressed = contents.len(),
        inflated = inflated.len(),
        "inflated gzip content"
    );

    Ok(inflated)
}
