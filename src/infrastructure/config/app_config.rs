//! Bot configuration.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use crate::domain::entities::Provider;
use crate::infrastructure::booru::{BooruSettings, DEFAULT_USER_AGENT, Rule34Credentials};

const APP_NAME: &str = "boorubot";
const APP_QUALIFIER: &str = "org";
const APP_ORGANIZATION: &str = "boorubot";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Bot configuration, read from `config.toml` and overridden by CLI flags.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Bot token. Normally supplied through `DISCORD_TOKEN`.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Outgoing HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Image search settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Rule34 API credentials.
    #[serde(default)]
    pub rule34: Rule34Config,

    /// Slash command registration.
    #[serde(default)]
    pub commands: CommandsConfig,
}

/// Outgoing HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// `User-Agent` sent to image boards.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpConfig {
    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// `[search]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Board searched when `/image search` is invoked without `site`.
    #[serde(default)]
    pub default_provider: Provider,
}

/// `[rule34]` section. Both values are needed for Rule34 searches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rule34Config {
    /// API key from the account settings page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Numeric user id paired with the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Rule34Config {
    /// Returns credentials when both halves are set.
    #[must_use]
    pub fn credentials(&self) -> Option<Rule34Credentials> {
        match (&self.api_key, &self.user_id) {
            (Some(api_key), Some(user_id)) if !api_key.is_empty() && !user_id.is_empty() => {
                Some(Rule34Credentials {
                    api_key: api_key.clone(),
                    user_id: user_id.clone(),
                })
            }
            _ => None,
        }
    }
}

/// `[commands]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Overwrite the global slash commands whenever the bot becomes ready.
    #[serde(default = "default_true")]
    pub register_on_ready: bool,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            register_on_ready: true,
        }
    }
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

const fn default_true() -> bool {
    true
}

impl BotConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(token) = args.token {
            self.token = Some(token);
        }
        if let Some(timeout) = args.http_timeout_secs {
            self.http.timeout_secs = timeout;
        }
        if let Some(provider) = args.default_site {
            self.search.default_provider = provider;
        }
        if let Some(api_key) = args.rule34_api_key {
            self.rule34.api_key = Some(api_key);
        }
        if let Some(user_id) = args.rule34_user_id {
            self.rule34.user_id = Some(user_id);
        }
        if let Some(register) = args.register_commands {
            self.commands.register_on_ready = register;
        }
    }

    /// Settings for the image-board client.
    #[must_use]
    pub fn booru_settings(&self) -> BooruSettings {
        BooruSettings {
            user_agent: self.http.user_agent.clone(),
            timeout: self.http.timeout(),
            rule34: self.rule34.credentials(),
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }
}
