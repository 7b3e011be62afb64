//! Application-wide error types.

use std::path::PathBuf;

use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors. Any of these aborts the run before state is advanced.
///
/// Per-entity fetch failures ([`crate::source::FetchError`]) and per-notification
/// sink failures ([`crate::notification::SinkError`]) are not represented here;
/// they are recorded in the run report instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("State file {path} is corrupt: {source}")]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error while {op} {path}: {source}")]
    IoPath {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn io_path(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoPath {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn corrupt_state(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CorruptState {
            path: path.into(),
            source,
        }
    }
}
