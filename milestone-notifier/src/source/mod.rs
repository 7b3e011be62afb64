//! Metric sources: where current subscriber and view counts come from.

mod youtube;

pub use youtube::YoutubeMetricSource;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

/// Per-entity fetch failure. The entity is skipped for the current run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("metric hidden by owner: {0}")]
    Hidden(String),
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("request failed: {0}")]
    Http(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Current state of a playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistSample {
    /// Sum of view counts over every listed video.
    pub total_views: u64,
    /// Video id → title.
    pub videos: BTreeMap<String, String>,
}

/// Capability to read current metric values.
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn fetch_subscriber_count(&self, channel_id: &str) -> Result<u64, FetchError>;

    async fn fetch_playlist(&self, playlist_id: &str) -> Result<PlaylistSample, FetchError>;

    async fn fetch_playlist_view_total(&self, playlist_id: &str) -> Result<u64, FetchError> {
        Ok(self.fetch_playlist(playlist_id).await?.total_views)
    }
}
