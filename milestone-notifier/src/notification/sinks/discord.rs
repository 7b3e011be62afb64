//! Discord webhook notification sink.
//!
//! Follows Discord's rate limit contract: a `429` response is retried after
//! the delay it announces (`Retry-After` / `X-RateLimit-Reset-After`, capped at
//! one minute), at most three times. Any other failure is returned immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::{NotificationSink, SinkError};
use crate::notification::events::NotificationEvent;

/// Maximum number of retries for rate-limited requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Longest announced rate-limit delay we are willing to wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

const SINK: &str = "discord";

/// Discord sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Discord webhook URL. Usually supplied through `DISCORD_WEBHOOK_URL`.
    pub webhook_url: String,
    /// Optional username for the webhook.
    pub username: Option<String>,
    /// Optional avatar URL for the webhook.
    pub avatar_url: Option<String>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            username: Some("milestone-notifier".to_string()),
            avatar_url: None,
        }
    }
}

/// Discord notification sink.
pub struct DiscordSink {
    config: DiscordConfig,
    client: Client,
}

impl DiscordSink {
    pub fn new(config: DiscordConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Get the embed color for an event.
    fn get_color(event: &NotificationEvent) -> u32 {
        match event {
            NotificationEvent::MilestoneReached(_) => 0xf1c40f, // Gold
            NotificationEvent::PlaylistVideoAdded { .. } => 0x2ecc71, // Green
            NotificationEvent::PlaylistVideoRemoved { .. } => 0x95a5a6, // Gray
        }
    }

    /// Build the webhook payload for an event.
    fn build_payload(&self, event: &NotificationEvent) -> serde_json::Value {
        let embed = json!({
            "title": event.title(),
            "description": event.description(),
            "url": event.url(),
            "color": Self::get_color(event),
            "timestamp": event.timestamp().to_rfc3339(),
            "footer": {
                "text": format!("Type: {}", event.event_type())
            }
        });

        let mut payload = json!({
            "embeds": [embed]
        });

        if let Some(username) = &self.config.username {
            payload["username"] = json!(username);
        }
        if let Some(avatar_url) = &self.config.avatar_url {
            payload["avatar_url"] = json!(avatar_url);
        }

        payload
    }

    /// Send request with rate limit handling.
    async fn send_with_retry(&self, payload: &serde_json::Value) -> Result<(), SinkError> {
        let mut retries = 0;

        loop {
            let response = self
                .client
                .post(&self.config.webhook_url)
                .json(payload)
                .send()
                .await
                .map_err(|e| SinkError::Request {
                    sink: SINK,
                    message: e.to_string(),
                })?;

            let status = response.status();

            if status.is_success() {
                return Ok(());
            }

            if status.as_u16() == 429 {
                let retry_after = parse_retry_after(response.headers());

                if retries >= MAX_RATE_LIMIT_RETRIES {
                    warn!(
                        "Discord rate limit: max retries ({}) exceeded, last retry_after was {:?}",
                        MAX_RATE_LIMIT_RETRIES, retry_after
                    );
                    return Err(SinkError::RateLimited {
                        sink: SINK,
                        retries: MAX_RATE_LIMIT_RETRIES,
                    });
                }

                retries += 1;
                let wait_duration = retry_after.unwrap_or(Duration::from_secs(1));
                debug!(
                    "Discord rate limited (429), waiting {:?} before retry ({}/{})",
                    wait_duration, retries, MAX_RATE_LIMIT_RETRIES
                );
                tokio::time::sleep(wait_duration).await;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Status {
                sink: SINK,
                status: status.as_u16(),
                body,
            });
        }
    }
}

/// Parse the Retry-After duration from 429 response headers, capped at
/// [`MAX_RETRY_AFTER`].
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    ["Retry-After", "X-RateLimit-Reset-After"]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok()?.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite())
        .find_map(|secs| {
            Duration::try_from_secs_f64(secs.min(MAX_RETRY_AFTER.as_secs_f64())).ok()
        })
}

#[async_trait]
impl NotificationSink for DiscordSink {
    fn sink_type(&self) -> &'static str {
        SINK
    }

    fn is_enabled(&self) -> bool {
        !self.config.webhook_url.is_empty()
    }

    async fn send(&self, event: &NotificationEvent) -> Result<(), SinkError> {
        let payload = self.build_payload(event);
        self.send_with_retry(&payload).await?;

        debug!("Discord notification sent: {}", event.event_type());
        Ok(())
    }
}
