//! Domain layer with core entities, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Serde utilities.
pub mod serde_utils;
/// Stateless domain services.
pub mod services;

pub use entities::{BotToken, Interaction, Post, Provider, TagQuery, normalize_tag};
pub use errors::{DiscordError, FetchError};
pub use ports::{DiscordPort, ImageBoardPort};
