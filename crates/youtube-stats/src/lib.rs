//! Minimal YouTube Data API v3 client for channel and playlist statistics.
//!
//! ```ignore
//! use youtube_stats::YoutubeClient;
//!
//! let client = YoutubeClient::new(api_key, reqwest::Client::new());
//! let stats = client.channel_statistics("UC_x5XG1OV2P6uZZ5FSM9Ttw").await?;
//! println!("{} subscribers", stats.subscriber_count);
//! ```

pub mod client;
pub mod error;
pub mod models;

pub use client::{DEFAULT_BASE_URL, MAX_RESULTS, YoutubeClient, sum_views};
pub use error::YoutubeError;
pub use models::{ChannelStatistics, PlaylistItem};
