//! Command-line arguments.

use super::app_config::LogLevel;
use crate::domain::entities::Provider;
use clap::Parser;
use std::path::PathBuf;

/// Command-line overrides for the configuration file.
#[derive(Debug, Parser)]
#[command(
    name = "boorubot",
    version,
    about = "Discord bot that posts image-board results and purges messages",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Discord bot token.
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Rule34 API key.
    #[arg(long, env = "RULE34_API_KEY", hide_env_values = true)]
    pub rule34_api_key: Option<String>,

    /// Rule34 user id.
    #[arg(long, env = "RULE34_USER_ID")]
    pub rule34_user_id: Option<String>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Timeout for outgoing HTTP requests, in seconds.
    #[arg(long, value_name = "SECS")]
    pub http_timeout_secs: Option<u64>,

    /// Board used when `site` is omitted (danbooru, safebooru, rule34).
    #[arg(long, value_name = "SITE")]
    pub default_site: Option<Provider>,

    /// Register slash commands on ready.
    #[arg(long)]
    pub register_commands: Option<bool>,
}
