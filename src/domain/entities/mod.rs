//! Domain entity definitions.

mod command;
mod ids;
mod interaction;
mod message;
mod permissions;
mod post;
mod provider;
mod tag;
mod token;

pub use command::{ApplicationCommand, CommandOptionSpec, CommandOptionType, OptionChoice};
pub use ids::{ApplicationId, ChannelId, GuildId, InteractionId, MessageId, UserId};
pub use interaction::{
    CommandData, CommandOption, Interaction, InteractionHandle, InteractionKind,
    InteractionToken, OptionValue, Visibility,
};
pub use message::Message;
pub use permissions::Permissions;
pub use post::Post;
pub use provider::{Provider, UnknownProvider};
pub use tag::{TagQuery, normalize_tag};
pub use token::BotToken;
