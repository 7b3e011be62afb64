//! [`MetricSource`] backed by the YouTube Data API.

use async_trait::async_trait;
use tracing::debug;
use youtube_stats::{YoutubeClient, YoutubeError, sum_views};

use super::{FetchError, MetricSource, PlaylistSample};

pub struct YoutubeMetricSource {
    client: YoutubeClient,
}

impl YoutubeMetricSource {
    pub fn new(client: YoutubeClient) -> Self {
        Self { client }
    }
}

impl From<YoutubeError> for FetchError {
    fn from(err: YoutubeError) -> Self {
        match err {
            YoutubeError::ChannelNotFound(id) | YoutubeError::PlaylistNotFound(id) => {
                Self::NotFound(id)
            }
            YoutubeError::SubscribersHidden(id) => Self::Hidden(id),
            YoutubeError::Api { status, message } => Self::Api { status, message },
            YoutubeError::HttpError(e) => Self::Http(e.to_string()),
            YoutubeError::JsonError(e) => Self::Decode(e.to_string()),
            e @ (YoutubeError::InvalidCount { .. } | YoutubeError::InvalidUrl(_)) => {
                Self::Decode(e.to_string())
            }
        }
    }
}

#[async_trait]
impl MetricSource for YoutubeMetricSource {
    async fn fetch_subscriber_count(&self, channel_id: &str) -> Result<u64, FetchError> {
        let stats = self.client.channel_statistics(channel_id).await?;
        debug!(channel_id, subscribers = stats.subscriber_count, "Fetched subscriber count");
        Ok(stats.subscriber_count)
    }

    async fn fetch_playlist(&self, playlist_id: &str) -> Result<PlaylistSample, FetchError> {
        let items = self.client.playlist_items(playlist_id).await?;
        let ids: Vec<String> = items.iter().map(|i| i.video_id.clone()).collect();
        let counts = self.client.video_view_counts(&ids).await?;
        let total_views = sum_views(&items, &counts);
        debug!(playlist_id, videos = items.len(), total_views, "Fetched playlist views");

        Ok(PlaylistSample {
            total_views,
            videos: items.into_iter().map(|i| (i.video_id, i.title)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            FetchError::from(YoutubeError::ChannelNotFound("UC1".into())),
            FetchError::NotFound(id) if id == "UC1"
        ));
        assert!(matches!(
            FetchError::from(YoutubeError::SubscribersHidden("UC1".into())),
            FetchError::Hidden(_)
        ));
        assert!(matches!(
            FetchError::from(YoutubeError::Api {
                status: 403,
                message: "quotaExceeded".into()
            }),
            FetchError::Api { status: 403, .. }
        ));
        assert!(matches!(
            FetchError::from(YoutubeError::InvalidCount {
                field: "viewCount",
                value: "x".into()
            }),
            FetchError::Decode(_)
        ));
    }
}
