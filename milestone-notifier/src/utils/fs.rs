//! Filesystem helpers shared across modules.
//!
//! Errors carry the operation and path they failed on.

use std::path::Path;

use crate::{Error, Result};

/// Ensure a directory exists, creating it (recursively) if needed.
pub fn ensure_dir_all_with_op(op: &'static str, path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::io_path(op, path, e))
}

/// Directory that holds `path`. A bare file name resolves to `.`.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Ensure the parent directory of a file path exists.
pub fn ensure_parent_dir_with_op(op: &'static str, path: &Path) -> Result<()> {
    ensure_dir_all_with_op(op, parent_dir(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("state.json")), Path::new("."));
        assert_eq!(parent_dir(Path::new("data/state.json")), Path::new("data"));
    }

    #[test]
    fn test_ensure_parent_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a/b/state.json");
        ensure_parent_dir_with_op("creating directory", &file).unwrap();
        assert!(dir.path().join("a/b").is_dir());
    }
}
