//! Durable storage behind the state store.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::StateMap;
use crate::utils::fs;
use crate::{Error, Result};

/// Where observation records live between runs.
pub trait StateBackend: Send {
    /// Human-readable location, used in logs.
    fn describe(&self) -> String;

    /// Read the whole mapping. A store that does not exist yet is empty.
    fn load(&self) -> Result<StateMap>;

    /// Replace the whole mapping in one step.
    fn persist(&self, state: &StateMap) -> Result<()>;
}

/// JSON document on disk, replaced atomically through a sibling temp file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateBackend for JsonFileBackend {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<StateMap> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No state file found, every entity starts at baseline");
                return Ok(StateMap::new());
            }
            Err(e) => return Err(Error::io_path("reading state file", &self.path, e)),
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            info!(path = %self.path.display(), "State file is empty, every entity starts at baseline");
            return Ok(StateMap::new());
        }

        let state: StateMap =
            serde_json::from_slice(&raw).map_err(|e| Error::corrupt_state(&self.path, e))?;
        debug!(path = %self.path.display(), records = state.len(), "Loaded state file");
        Ok(state)
    }

    fn persist(&self, state: &StateMap) -> Result<()> {
        let dir = fs::parent_dir(&self.path);
        fs::ensure_dir_all_with_op("creating state directory", dir)?;

        let json = serde_json::to_vec_pretty(state)?;

        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| Error::io_path("creating temp state file in", dir, e))?;
        tmp.write_all(&json)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| Error::io_path("writing temp state file", tmp.path().to_path_buf(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| Error::io_path("replacing state file", &self.path, e.error))?;

        debug!(path = %self.path.display(), records = state.len(), "State file replaced");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    state: Mutex<StateMap>,
    fail_persist: AtomicBool,
    persist_count: AtomicUsize,
}

/// In-process backend for tests and dry runs. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<MemoryInner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: StateMap) -> Self {
        let backend = Self::default();
        *backend.inner.state.lock() = state;
        backend
    }

    /// Make subsequent `persist` calls fail (or succeed again).
    pub fn set_fail_persist(&self, fail: bool) {
        self.inner.fail_persist.store(fail, Ordering::SeqCst);
    }

    /// Copy of what was last persisted.
    pub fn snapshot(&self) -> StateMap {
        self.inner.state.lock().clone()
    }

    pub fn persist_count(&self) -> usize {
        self.inner.persist_count.load(Ordering::SeqCst)
    }
}

impl StateBackend for MemoryBackend {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn load(&self) -> Result<StateMap> {
        Ok(self.snapshot())
    }

    fn persist(&self, state: &StateMap) -> Result<()> {
        if self.inner.fail_persist.load(Ordering::SeqCst) {
            return Err(Error::io_path(
                "replacing state file",
                "memory",
                std::io::Error::other("simulated persistence failure"),
            ));
        }
        *self.inner.state.lock() = state.clone();
        self.inner.persist_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ObservationRecord;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn record(value: u64) -> ObservationRecord {
        ObservationRecord::new(value, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("state.json"));
        assert!(backend.load().unwrap().is_empty());
    }

    #[test]
    fn test_whitespace_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "  \n").unwrap();
        assert!(JsonFileBackend::new(&path).load().unwrap().is_empty());
    }

    #[test]
    fn test_garbage_is_corrupt_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{\"channel:UC1\": {\"last_value\": ").unwrap();

        let err = JsonFileBackend::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::CorruptState { .. }));
        // The unreadable file is left for the operator.
        assert!(path.exists());
    }

    #[test]
    fn test_non_utf8_is_corrupt_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, [0xff, 0xfe, b'{']).unwrap();

        let err = JsonFileBackend::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::CorruptState { .. }));
    }

    #[test]
    fn test_wrong_shape_is_corrupt_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"channels": [], "videos": []}"#).unwrap();

        let err = JsonFileBackend::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::CorruptState { .. }));
    }

    #[test]
    fn test_persist_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let backend = JsonFileBackend::new(&path);

        let mut state = StateMap::new();
        state.insert("channel:UC1".to_string(), record(1200));
        state.insert("playlist:PL1".to_string(), record(50_000));
        backend.persist(&state).unwrap();

        assert_eq!(backend.load().unwrap(), state);

        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path() != path)
            .collect();
        assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
    }

    #[test]
    fn test_persist_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let backend = JsonFileBackend::new(&path);

        let mut state = StateMap::new();
        state.insert("channel:UC1".to_string(), record(1));
        backend.persist(&state).unwrap();

        state.insert("channel:UC1".to_string(), record(2));
        backend.persist(&state).unwrap();

        assert_eq!(backend.load().unwrap()["channel:UC1"].last_value, 2);
    }

    #[test]
    fn test_memory_backend_failure_toggle() {
        let backend = MemoryBackend::new();
        backend.set_fail_persist(true);
        assert!(backend.persist(&StateMap::new()).is_err());
        assert_eq!(backend.persist_count(), 0);

        backend.set_fail_persist(false);
        backend.persist(&StateMap::new()).unwrap();
        assert_eq!(backend.persist_count(), 1);
    }
}
