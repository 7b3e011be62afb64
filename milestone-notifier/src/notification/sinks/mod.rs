//! Notification sinks.
//!
//! - Discord webhooks
//! - Twitter (X) API v2 posts

mod discord;
mod twitter;

pub use discord::{DiscordConfig, DiscordSink};
pub use twitter::{TwitterConfig, TwitterSink};

use async_trait::async_trait;
use thiserror::Error;

use super::events::NotificationEvent;

/// Failure to deliver one notification through one sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("{sink} request failed: {message}")]
    Request { sink: &'static str, message: String },
    #[error("{sink} responded with {status}: {body}")]
    Status {
        sink: &'static str,
        status: u16,
        body: String,
    },
    #[error("{sink} rate limit exceeded after {retries} retries")]
    RateLimited { sink: &'static str, retries: u32 },
}

/// An external channel notifications are delivered to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Get the sink type name.
    fn sink_type(&self) -> &'static str;

    /// Whether the sink has what it needs (credentials, URL) to send.
    fn is_enabled(&self) -> bool;

    /// Send a notification through this sink.
    async fn send(&self, event: &NotificationEvent) -> Result<(), SinkError>;
}
