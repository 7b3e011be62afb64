//! Logging setup: console output plus optional daily-rolling log files.
//!
//! Timestamps are written in the local timezone. The filter comes from the
//! configured level (adjusted by `-v`/`-q`), unless `RUST_LOG` is set.

use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::utils::fs;

/// Log file name prefix inside the log directory.
const LOG_FILE_NAME: &str = "milestone-notifier.log";

/// Severity threshold accepted in the configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Apply the command line overrides. `quiet` wins over `verbose`.
    pub fn adjusted(self, verbose: bool, quiet: bool) -> Self {
        if quiet {
            Self::Error
        } else if verbose {
            self.min(Self::Debug)
        } else {
            self
        }
    }

    /// Filter directive for our crates; HTTP internals stay at `warn`.
    pub fn directive(&self) -> String {
        let level = self.as_str();
        format!("milestone_notifier={level},youtube_stats={level},reqwest=warn,hyper=warn")
    }
}

/// Custom timer that uses the local timezone via chrono.
#[derive(Debug, Clone, Copy)]
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()))
}

/// Install the global subscriber.
///
/// With `log_dir` set, events are also written to a daily-rolling file; the
/// returned guard must stay alive until exit so buffered lines are flushed.
pub fn init_logging(level: LogLevel, log_dir: Option<&Path>) -> crate::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            fs::ensure_dir_all_with_op("creating log directory", dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTimer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_timer(LocalTimer),
        )
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::Error::Other(format!("Failed to set global default subscriber: {}", e)))?;

    Ok(guard)
}
