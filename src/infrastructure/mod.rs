//! Infrastructure layer with external service adapters.

/// Image-board HTTP client.
pub mod booru;
/// Bot configuration.
pub mod config;
/// Discord REST and gateway clients.
pub mod discord;

pub use booru::{BooruClient, BooruSettings, Rule34Credentials};
pub use config::{BotConfig, CliArgs, LogLevel, StorageManager};
pub use discord::{
    DiscordClient, DispatchEvent, GatewayClient, GatewayClientConfig, GatewayEventKind,
    GatewayIntents,
};
