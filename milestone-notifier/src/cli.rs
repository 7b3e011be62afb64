use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (JSON, or TOML with a `.toml` extension)
    #[arg(short, long, global = true, env = "MILESTONE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every configured entity once and announce new milestones
    Run {
        /// Log what would be announced without notifying or saving state
        #[arg(long)]
        dry_run: bool,

        /// State file, overriding `state_path` from the configuration
        #[arg(long)]
        state: Option<PathBuf>,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// Load and validate the configuration, then print a summary
    Validate,

    /// Print the persisted state
    State {
        /// State file, overriding `state_path` from the configuration
        #[arg(long)]
        state: Option<PathBuf>,
    },
}

/// Secrets for the external services.
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct Credentials {
    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: Option<String>,

    /// Discord webhook URL
    #[arg(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    pub discord_webhook_url: Option<String>,

    /// Twitter user access token with `tweet.write` scope
    #[arg(long, env = "TWITTER_BEARER_TOKEN", hide_env_values = true)]
    pub twitter_bearer_token: Option<String>,
}

/// Treat blank secrets as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
