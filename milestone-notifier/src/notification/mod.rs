//! Notification system module.
//!
//! Turns threshold crossings and playlist membership changes into messages
//! and delivers them to the configured sinks (Discord webhooks, Twitter).
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use milestone_notifier::notification::{DiscordConfig, DiscordSink, NotificationDispatcher};
//!
//! let discord = DiscordSink::new(
//!     DiscordConfig {
//!         webhook_url: "https://discord.com/api/webhooks/...".to_string(),
//!         ..Default::default()
//!     },
//!     reqwest::Client::new(),
//! );
//! let dispatcher = NotificationDispatcher::new(Arc::new(discord));
//! ```

pub mod dispatcher;
pub mod events;
pub mod sinks;

pub use dispatcher::{DispatchReport, NotificationDispatcher, SinkFailure};
pub use events::{CrossingEvent, NotificationEvent, format_count};
pub use sinks::{
    DiscordConfig, DiscordSink, NotificationSink, SinkError, TwitterConfig, TwitterSink,
};
