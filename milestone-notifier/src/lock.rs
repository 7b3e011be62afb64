//! Advisory lock that keeps two runs from racing on the same state file.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::utils::fs;
use crate::{Error, Result};

/// Exclusive lock on a file, released when dropped.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Try to take the lock without waiting.
    ///
    /// Returns `Ok(None)` when another process already holds it.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        fs::ensure_parent_dir_with_op("creating lock directory", path)?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|e| Error::io_path("opening lock file", path, e))?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!(path = %path.display(), "Run lock acquired");
                Ok(Some(Self {
                    file,
                    path: path.to_path_buf(),
                }))
            }
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(Error::io_path("locking", path, e)),
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "Failed to release run lock");
        }
    }
}

/// Default lock location: next to the state file.
pub fn default_lock_path(state_path: &Path) -> PathBuf {
    let mut name = state_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "state".into());
    name.push(".lock");
    state_path.with_file_name(name)
}
