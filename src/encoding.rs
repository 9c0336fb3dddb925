//! Character-encoding transcoding to canonical UTF-8.
//!
//! The declared input encoding is trusted from the caller, never
//! auto-detected. UTF-8 input passes through untouched; Windows-1252 is
//! decoded with `encoding_rs`, whose substitution policy applies to any
//! input the index does not cover.

use serde::{Deserialize, Serialize};

/// Declared encoding of fetched content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileEncoding {
    /// UTF-8, the canonical output encoding.
    #[default]
    #[serde(rename = "UTF-8")]
    Utf8,
    /// Windows-1252 (Latin-1 superset common in legacy exports).
    #[serde(rename = "Windows-1252")]
    Windows1252,
}

/// Transcodes `contents` from the declared encoding to UTF-8.
///
/// A no-op for [`FileEncoding::Utf8`]; the buffer is returned unchanged.
#[must_use]
pub fn transcode(contents: Vec<u8>, from: FileEncoding) -> Vec<u8> {
    match from {
        FileEncoding::Utf8 => contents,
        FileEncoding::Windows1252 => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&contents);
            decoded.into_owned().into_bytes()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_encoding_is_utf8() {
        assert_eq!(FileEncoding::default(), FileEncoding::Utf8);
    }

    #[test]
    fn test_utf8_transcode_is_identity() {
        let contents = "héllo wörld".as_bytes().to_vec();
        assert_eq!(transcode(contents.clone(), FileEncoding::Utf8), contents);
    }

    #[test]
    fn test_windows_1252_high_bytes_become_utf8() {
        // 0xE9 is é, 0x80 is the euro sign in Windows-1252.
        let contents = vec![b'c', b'a', b'f', 0xE9, b' ', 0x80];
        let result = transcode(contents, FileEncoding::Windows1252);
        assert_eq!(String::from_utf8(result).unwrap(), "café €");
    }

    #[test]
    fn test_windows_1252_ascii_is_unchanged() {
        let contents = b"plain ascii".to_vec();
        assert_eq!(
            transcode(contents.clone(), FileEncoding::Windows1252),
            contents
        );
    }

}
