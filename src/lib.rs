//! Boorubot - a Discord bot for image-board searches and message purges.
//!
//! `/image search` posts random image URLs from Danbooru, Safebooru or
//! Rule34 matching up to two tags. `/purge` deletes a range of channel
//! messages, optionally limited to one author.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing use cases and DTOs.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing slash commands and the bot loop.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "boorubot";
