//! Zip archive stage.
//!
//! Stages the payload to disk next to the destination path, opens it as an
//! archive, and replaces the content with the single extracted file. On-disk
//! staging keeps memory flat for large archives; the staging artifacts are
//! removed on success and failure paths alike.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zip::ZipArchive;

use super::NormalizeError;
use super::cleanup::remove_tree;

/// Extracts the single file from a `.zip`-suffixed payload.
///
/// Staging paths derive from `destination` (`-zipped` file, `-unzipped`
/// directory) so concurrent retrievals with distinct destinations cannot
/// collide. Content that does not open as an archive passes through
/// unchanged.
pub(super) fn extract_single_file(
    url: &str,
    contents: Vec<u8>,
    destination: &Path,
) -> Result<Vec<u8>, NormalizeError> {
    debug!(url, "got a file ending in .zip, trying to unzip");

    let staged = sibling(destination, "-zipped");
    let extract_dir = sibling(destination, "-unzipped");

    std::fs::write(&staged, &contents).map_err(|e| NormalizeError::io(&staged, e))?;

    let result = extract_inner(contents, &staged, &extract_dir);

    // Staging artifacts go away whether extraction worked or not.
    if let Err(e) = remove_tree(&extract_dir) {
        warn!(path = %extract_dir.display(), error = %e, "failed to remove extraction directory");
    }
    if let Err(e) = std::fs::remove_file(&staged) {
        warn!(path = %staged.display(), error = %e, "failed to remove staged archive");
    }

    result
}

fn extract_inner(
    contents: Vec<u8>,
    staged: &Path,
    extract_dir: &Path,
) -> Result<Vec<u8>, NormalizeError> {
    let file = File::open(staged).map_err(|e| NormalizeError::io(staged, e))?;

    let mut archive = match ZipArchive::new(file) {
        Ok(archive) => archive,
        Err(e) => {
            info!(
                error = %e,
                "skipped unzipping: not a real zip archive despite the .zip suffix"
            );
            return Ok(contents);
        }
    };

    archive
        .extract(extract_dir)
        .map_err(|e| NormalizeError::Archive {
            path: staged.to_path_buf(),
            message: e.to_string(),
        })?;

    // Regular files in the extraction root only; entries that extracted into
    // subdirectories are skipped, matching the suffix-driven single-file
    // contract.
    let mut files = list_regular_files(extract_dir)?;
    files.sort();

    let first = match files.as_slice() {
        [] => {
            return Err(NormalizeError::EmptyArchive {
                path: staged.to_path_buf(),
            });
        }
        [only] => only,
        [first, ..] => {
            warn!(count = files.len(), "more than one file in zip archive");
            first
        }
    };

    debug!(file = %first.display(), "extracted single file from archive");
    std::fs::read(first).map_err(|e| NormalizeError::io(first, e))
}

/// Lists regular files directly under `dir`, skipping subdirectories.
fn list_regular_files(dir: &Path) -> Result<Vec<PathBuf>, NormalizeError> {
    let entries = std::fs::read_dir(dir).map_err(|e| NormalizeError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| NormalizeError::io(dir, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| NormalizeError::io(entry.path(), e))?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

/// Appends `suffix` to the final path component.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
