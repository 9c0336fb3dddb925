//! Recursive directory-tree removal for staging cleanup.

use std::io;
use std::path::Path;

/// Recursively deletes `path` and everything under it, children before
/// parents.
///
/// A missing path is trivial success. A plain file or symlink argument is
/// unlinked directly. The first removal that fails aborts the walk; the
/// remainder of the tree may be left behind (best-effort, not
/// transactional).
///
/// # Errors
///
/// Returns the first IO error encountered while reading or removing
/// entries.
pub fn remove_tree(path: &Path) -> io::Result<()> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    if !metadata.is_dir() {
        return std::fs::remove_file(path);
    }

    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        // file_type() does not follow symlinks, so a symlinked directory is
        // unlinked rather than descended into.
        if entry.file_type()?.is_dir() {
            remove_tree(&entry.path())?;
        } else {
            std::fs::remove_file(entry.path())?;
        }
    }

    std::fs::remove_dir(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_path_is_success() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(remove_tree(&missing).is_ok());
    }

    #[test]
    fn test_plain_file_is_unlinked() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, b"content").unwrap();

        remove_tree(&file).unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn test_nested_tree_is_fully_removed() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        std::fs::create_dir_all(root.join("a/b")).unwrap();
        std::fs::write(root.join("top.txt"), b"top").unwrap();
        std::fs::write(root.join("a/mid.txt"), b"mid").unwrap();
        std::fs::write(root.join("a/b/deep.txt"), b"deep").unwrap();

        remove_tree(&root).unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_empty_directory_is_removed() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("empty");
        std::fs::create_dir(&root).unwrap();

        remove_tree(&root).unwrap();
        assert!(!root.exists());
    }
}
