use std::collections::HashMap;
use std::sync::LazyLock;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::YoutubeError;
use crate::models::{
    ChannelItem, ChannelStatistics, ErrorResponse, ListResponse, PlaylistItem, PlaylistItemRaw,
    VideoItem, parse_count,
};

/// Maximum page size / id batch accepted by the Data API.
pub const MAX_RESULTS: usize = 50;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

static DEFAULT_URL: LazyLock<Url> = LazyLock::new(|| Url::parse(DEFAULT_BASE_URL).unwrap());

/// Client for the statistics-related endpoints of the YouTube Data API v3.
#[derive(Debug, Clone)]
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl YoutubeClient {
    pub fn new(api_key: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_URL.clone(),
        }
    }

    /// Point the client at another API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, YoutubeError> {
        let mut url = Url::parse(base_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        Ok(self)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, YoutubeError> {
        let url = self.base_url.join(endpoint)?;
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => err.error.message,
                Err(_) => body,
            };
            return Err(YoutubeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch the statistics block of a channel.
    pub async fn channel_statistics(
        &self,
        channel_id: &str,
    ) -> Result<ChannelStatistics, YoutubeError> {
        debug!(channel_id, "Fetching channel statistics");
        let response: ListResponse<ChannelItem> = self
            .get_json("channels", &[("part", "statistics"), ("id", channel_id)])
            .await?;

        let item = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| YoutubeError::ChannelNotFound(channel_id.to_string()))?;
        item.into_statistics()
    }

    /// List every video in a playlist, following page tokens.
    pub async fn playlist_items(&self, playlist_id: &str) -> Result<Vec<PlaylistItem>, YoutubeError> {
        let max_results = MAX_RESULTS.to_string();
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("part", "snippet,contentDetails"),
                ("playlistId", playlist_id),
                ("maxResults", max_results.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let response: ListResponse<PlaylistItemRaw> =
                match self.get_json("playlistItems", &params).await {
                    Err(YoutubeError::Api { status: 404, .. }) => {
                        return Err(YoutubeError::PlaylistNotFound(playlist_id.to_string()));
                    }
                    other => other?,
                };

            items.extend(response.items.into_iter().map(PlaylistItem::from));

            match response.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(playlist_id, count = items.len(), "Fetched playlist items");
        Ok(items)
    }

    /// Fetch view counts for a set of videos, batching ids per request.
    ///
    /// Videos the API does not return (private, deleted) are absent from the map.
    pub async fn video_view_counts(
        &self,
        video_ids: &[String],
    ) -> Result<HashMap<String, u64>, YoutubeError> {
        let mut counts = HashMap::with_capacity(video_ids.len());

        for chunk in video_ids.chunks(MAX_RESULTS) {
            let ids = chunk.join(",");
            let response: ListResponse<VideoItem> = self
                .get_json("videos", &[("part", "statistics"), ("id", ids.as_str())])
                .await?;

            for item in response.items {
                let views = parse_count(
                    "viewCount",
                    item.statistics.as_ref().and_then(|s| s.view_count.as_deref()),
                )?;
                counts.insert(item.id, views);
            }
        }

        Ok(counts)
    }
}

/// Sum the views of `items`, treating videos without statistics as zero.
pub fn sum_views(items: &[PlaylistItem], counts: &HashMap<String, u64>) -> u64 {
    items
        .iter()
        .map(|item| match counts.get(&item.video_id) {
            Some(views) => *views,
            None => {
                warn!(video_id = %item.video_id, "No statistics for video, counting zero views");
                0
            }
        })
        .fold(0u64, |acc, v| acc.saturating_add(v))
}
