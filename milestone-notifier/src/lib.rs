//! milestone-notifier library crate.
//!
//! Watches YouTube channel subscriber counts and playlist view totals and
//! announces configured milestones on Discord and Twitter. The binary runs
//! one pass per invocation; scheduling is left to cron or a systemd timer.

pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod lock;
pub mod logging;
pub mod notification;
pub mod runner;
pub mod source;
pub mod state;
pub mod utils;

pub use error::{Error, Result};
