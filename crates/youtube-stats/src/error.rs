use thiserror::Error;

#[derive(Debug, Error)]
pub enum YoutubeError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("channel not found: {0}")]
    ChannelNotFound(String),
    #[error("subscriber count is hidden for channel {0}")]
    SubscribersHidden(String),
    #[error("playlist not found: {0}")]
    PlaylistNotFound(String),
    #[error("invalid count {value:?} for {field}")]
    InvalidCount { field: &'static str, value: String },
}
