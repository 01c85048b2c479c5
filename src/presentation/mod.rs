//! Presentation layer: slash commands, interaction handling and the bot loop.

/// Bot run loop.
pub mod bot;
/// Slash command definitions and option parsing.
pub mod commands;
/// Interaction dispatch.
pub mod handler;

pub use bot::Bot;
pub use commands::{BotCommand, CommandError, application_commands};
pub use handler::InteractionHandler;
