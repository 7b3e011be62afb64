//! Observation state: the last known value and high-water cursor per entity.
//!
//! The store keeps the committed mapping loaded at startup plus a set of
//! staged updates. Staged updates are visible to `get` immediately
//! (read-your-writes) and reach the backend only through
//! [`StateStore::persist_all`], which replaces the whole mapping at once.

mod backend;

pub use backend::{JsonFileBackend, MemoryBackend, StateBackend};

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Result;
use crate::domain::EntityKey;

/// Persisted mapping, keyed by `"<kind>:<id>"`.
///
/// Keys are kept as plain strings so records of entities that were removed
/// from the configuration survive untouched.
pub type StateMap = BTreeMap<String, ObservationRecord>;

/// Last observation of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRecord")]
pub struct ObservationRecord {
    pub last_value: u64,
    /// Largest value ever persisted; thresholds at or below it are announced.
    pub high_water: u64,
    pub last_updated: DateTime<Utc>,
    /// Playlist members (video id → title) as of the last fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<BTreeMap<String, String>>,
}

/// On-disk shape; `high_water` may be absent in files written by older versions.
#[derive(Deserialize)]
struct RawRecord {
    last_value: u64,
    high_water: Option<u64>,
    last_updated: DateTime<Utc>,
    #[serde(default)]
    videos: Option<BTreeMap<String, String>>,
}

impl From<RawRecord> for ObservationRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            last_value: raw.last_value,
            high_water: raw.high_water.unwrap_or(raw.last_value).max(raw.last_value),
            last_updated: raw.last_updated,
            videos: raw.videos,
        }
    }
}

impl ObservationRecord {
    pub fn new(value: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            last_value: value,
            high_water: value,
            last_updated: timestamp,
            videos: None,
        }
    }

    /// The crossed-threshold cursor.
    pub fn cursor(&self) -> u64 {
        self.high_water
    }
}

/// Single-writer owner of the observation records during a run.
pub struct StateStore {
    backend: Box<dyn StateBackend>,
    committed: StateMap,
    staged: StateMap,
}

impl StateStore {
    /// Read the backend. Fails with `CorruptState` on unreadable content.
    pub fn load(backend: impl StateBackend + 'static) -> Result<Self> {
        let committed = backend.load()?;
        info!(
            location = %backend.describe(),
            records = committed.len(),
            "State loaded"
        );
        Ok(Self {
            backend: Box::new(backend),
            committed,
            staged: StateMap::new(),
        })
    }

    /// Current record for `key`, staged updates first.
    pub fn get(&self, key: &EntityKey) -> Option<&ObservationRecord> {
        let key = key.to_string();
        self.staged.get(&key).or_else(|| self.committed.get(&key))
    }

    /// Stage a new observation. The high-water cursor only moves up and
    /// playlist members carry over until replaced.
    pub fn update(
        &mut self,
        key: &EntityKey,
        value: u64,
        timestamp: DateTime<Utc>,
    ) -> &mut ObservationRecord {
        let record = match self.get(key) {
            Some(prev) => ObservationRecord {
                last_value: value,
                high_water: prev.high_water.max(value),
                last_updated: timestamp,
                videos: prev.videos.clone(),
            },
            None => ObservationRecord::new(value, timestamp),
        };
        debug!(key = %key, value, high_water = record.high_water, "Staged observation");

        match self.staged.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(record);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(record),
        }
    }

    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Commit every staged update with one backend write.
    ///
    /// On failure the staged updates are kept and the committed view is
    /// unchanged. Returns the number of records committed.
    pub fn persist_all(&mut self) -> Result<usize> {
        if self.staged.is_empty() {
            debug!("No staged observations, state left untouched");
            return Ok(0);
        }

        let mut next = self.committed.clone();
        next.extend(self.staged.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.backend.persist(&next)?;

        let count = self.staged.len();
        self.committed = next;
        self.staged.clear();
        info!(
            location = %self.backend.describe(),
            updated = count,
            total = self.committed.len(),
            "State persisted"
        );
        Ok(count)
    }

    /// Committed records.
    pub fn records(&self) -> &StateMap {
        &self.committed
    }
}
