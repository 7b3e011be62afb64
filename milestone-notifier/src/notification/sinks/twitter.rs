//! Twitter (X) notification sink, posting through the v2 `tweets` endpoint.
//!
//! Authenticates with an OAuth 2.0 user-context bearer token that carries the
//! `tweet.write` scope. Token issuance and refresh happen outside this process.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{NotificationSink, SinkError};
use crate::notification::events::NotificationEvent;

/// Maximum post length accepted by the API.
pub const MAX_TWEET_CHARS: usize = 280;

const SINK: &str = "twitter";

/// Twitter sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    /// User access token. Usually supplied through `TWITTER_BEARER_TOKEN`.
    #[serde(skip_serializing)]
    pub bearer_token: String,
    /// Endpoint used to create posts.
    pub api_url: String,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            bearer_token: String::new(),
            api_url: "https://api.twitter.com/2/tweets".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: Option<CreatedTweet>,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

/// Twitter notification sink.
pub struct TwitterSink {
    config: TwitterConfig,
    client: Client,
}

impl TwitterSink {
    pub fn new(config: TwitterConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Post text for an event, cut to the API limit on a character boundary.
    fn build_text(event: &NotificationEvent) -> String {
        let text = format!("{}\n{}", event.description(), event.url());
        truncate_chars(&text, MAX_TWEET_CHARS)
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[async_trait]
impl NotificationSink for TwitterSink {
    fn sink_type(&self) -> &'static str {
        SINK
    }

    fn is_enabled(&self) -> bool {
        !self.config.bearer_token.is_empty()
    }

    async fn send(&self, event: &NotificationEvent) -> Result<(), SinkError> {
        let body = json!({ "text": Self::build_text(event) });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.bearer_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SinkError::Request {
                sink: SINK,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Status {
                sink: SINK,
                status: status.as_u16(),
                body,
            });
        }

        let tweet_id = response
            .json::<CreateTweetResponse>()
            .await
            .ok()
            .and_then(|r| r.data)
            .map(|d| d.id);
        debug!(tweet_id = ?tweet_id, "Twitter notification sent: {}", event.event_type());
        Ok(())
    }
}
