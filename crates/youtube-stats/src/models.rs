//! Response models for the statistics endpoints.
//!
//! Only the fields this crate reads are modelled; everything else in the
//! API responses is ignored by serde.

use serde::Deserialize;

use crate::error::YoutubeError;

/// Generic list envelope shared by `channels`, `playlistItems` and `videos`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ChannelItem {
    pub id: String,
    pub statistics: ChannelStatisticsRaw,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatisticsRaw {
    pub subscriber_count: Option<String>,
    pub view_count: Option<String>,
    pub video_count: Option<String>,
    #[serde(default)]
    pub hidden_subscriber_count: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemRaw {
    pub snippet: Option<PlaylistItemSnippet>,
    pub content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItemSnippet {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemContentDetails {
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
pub struct VideoItem {
    pub id: String,
    pub statistics: Option<VideoStatisticsRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatisticsRaw {
    pub view_count: Option<String>,
}

/// Channel statistics with counts parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStatistics {
    pub channel_id: String,
    pub subscriber_count: u64,
    pub view_count: u64,
    pub video_count: u64,
}

/// A video listed in a playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistItem {
    pub video_id: String,
    pub title: String,
}

impl From<PlaylistItemRaw> for PlaylistItem {
    fn from(raw: PlaylistItemRaw) -> Self {
        Self {
            video_id: raw.content_details.video_id,
            title: raw.snippet.map(|s| s.title).unwrap_or_default(),
        }
    }
}

/// Parse a decimal count as the API encodes it. Absent counts are zero.
pub(crate) fn parse_count(field: &'static str, value: Option<&str>) -> Result<u64, YoutubeError> {
    match value {
        None => Ok(0),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| YoutubeError::InvalidCount {
                field,
                value: raw.to_string(),
            }),
    }
}

impl ChannelItem {
    pub(crate) fn into_statistics(self) -> Result<ChannelStatistics, YoutubeError> {
        if self.statistics.hidden_subscriber_count {
            return Err(YoutubeError::SubscribersHidden(self.id));
        }
        Ok(ChannelStatistics {
            subscriber_count: parse_count(
                "subscriberCount",
                self.statistics.subscriber_count.as_deref(),
            )?,
            view_count: parse_count("viewCount", self.statistics.view_count.as_deref())?,
            video_count: parse_count("videoCount", self.statistics.video_count.as_deref())?,
            channel_id: self.id,
        })
    }
}
