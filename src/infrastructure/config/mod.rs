//! Bot configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{
    BotConfig, CommandsConfig, HttpConfig, LogLevel, Rule34Config, SearchConfig,
};
pub use args::CliArgs;
pub use storage::{ConfigError, StorageManager};
