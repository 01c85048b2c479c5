//! Domain error types.

mod discord_error;
mod fetch_error;

pub use discord_error::DiscordError;
pub use fetch_error::FetchError;
