//! Application configuration.
//!
//! Loaded once at startup from a JSON file, or TOML when the file name ends
//! in `.toml`. Credentials are not read here; the CLI takes them from the
//! environment and overlays them onto the sink settings.

mod plan;

pub use plan::MonitorPlan;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{EntityKind, ThresholdSet, TrackedEntity};
use crate::logging::LogLevel;
use crate::notification::{DiscordConfig, TwitterConfig};
use crate::{Error, Result};

/// Default configuration file name.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// One channel or playlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub id: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub twitter_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: LogLevel,
    pub subscriber_thresholds: Vec<u64>,
    pub view_thresholds: Vec<u64>,
    pub channels: Vec<EntityConfig>,
    pub playlists: Vec<EntityConfig>,
    pub state_path: PathBuf,
    /// Run lock file. Defaults to `<state_path>.lock`.
    pub lock_path: Option<PathBuf>,
    /// Per HTTP request timeout.
    pub request_timeout_secs: u64,
    /// Upper bound for fetching one entity, across all of its requests.
    pub fetch_timeout_secs: u64,
    /// Pause between consecutive notifications.
    pub notify_interval_ms: u64,
    pub track_playlist_membership: bool,
    /// Also write daily-rolling log files here.
    pub log_dir: Option<PathBuf>,
    pub discord: DiscordConfig,
    pub twitter: TwitterConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            subscriber_thresholds: Vec::new(),
            view_thresholds: Vec::new(),
            channels: Vec::new(),
            playlists: Vec::new(),
            state_path: PathBuf::from("data/state.json"),
            lock_path: None,
            request_timeout_secs: 30,
            fetch_timeout_secs: 120,
            notify_interval_ms: 1000,
            track_playlist_membership: true,
            log_dir: None,
            discord: DiscordConfig::default(),
            twitter: TwitterConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::config(format!("config file {} not found", path.display()))
            }
            _ => Error::io_path("reading config file", path, e),
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml(&raw)
        } else {
            Self::from_json(&raw)
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::config(format!("invalid config: {}", e)))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::config(format!("invalid config: {}", e)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn notify_interval(&self) -> Duration {
        Duration::from_millis(self.notify_interval_ms)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.lock_path
            .clone()
            .unwrap_or_else(|| crate::lock::default_lock_path(&self.state_path))
    }

    /// Validate thresholds and entities into a [`MonitorPlan`].
    pub fn plan(&self) -> Result<MonitorPlan> {
        let subscriber_thresholds =
            ThresholdSet::new("subscriber_thresholds", self.subscriber_thresholds.clone())?;
        let view_thresholds = ThresholdSet::new("view_thresholds", self.view_thresholds.clone())?;

        if self.fetch_timeout_secs == 0 {
            return Err(Error::config("fetch_timeout_secs must be greater than zero"));
        }

        let mut seen = HashSet::new();
        let mut entities = Vec::with_capacity(self.channels.len() + self.playlists.len());
        let sections = [
            (EntityKind::Channel, &self.channels),
            (EntityKind::Playlist, &self.playlists),
        ];

        for (kind, entries) in sections {
            for (pos, entry) in entries.iter().enumerate() {
                let id = entry.id.trim();
                if id.is_empty() {
                    return Err(Error::config(format!("{}s[{}]: id must not be empty", kind, pos)));
                }
                if !seen.insert((kind, id.to_string())) {
                    return Err(Error::config(format!("{}s[{}]: duplicate id '{}'", kind, pos, id)));
                }

                let description = if entry.desc.trim().is_empty() {
                    id.to_string()
                } else {
                    entry.desc.clone()
                };
                let entity = match kind {
                    EntityKind::Channel => TrackedEntity::channel(id, description),
                    EntityKind::Playlist => TrackedEntity::playlist(id, description),
                };
                entities.push(entity.with_twitter(entry.twitter_enabled));
            }
        }

        if subscriber_thresholds.is_empty() && !self.channels.is_empty() {
            warn!("No subscriber_thresholds configured, channel milestones will never fire");
        }
        if view_thresholds.is_empty() && !self.playlists.is_empty() {
            warn!("No view_thresholds configured, playlist milestones will never fire");
        }

        Ok(MonitorPlan {
            entities,
            subscriber_thresholds,
            view_thresholds,
        })
    }
}
