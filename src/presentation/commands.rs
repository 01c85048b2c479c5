//! Slash command definitions and option parsing.

use thiserror::Error;

use crate::application::dto::{PurgeRequest, SearchRequest};
use crate::domain::entities::{
    ApplicationCommand, ChannelId, CommandData, CommandOption, CommandOptionSpec,
    CommandOptionType, MessageId, OptionValue, Provider, UserId,
};

/// `/image` command name.
pub const IMAGE_COMMAND: &str = "image";
/// `/image search` subcommand name.
pub const SEARCH_SUBCOMMAND: &str = "search";
/// `/purge` command name.
pub const PURGE_COMMAND: &str = "purge";

/// Problems found while reading an invoked command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum CommandError {
    #[error("Unknown command.")]
    UnknownCommand { name: String },

    #[error("❌ Missing required option `{name}`.")]
    MissingOption { name: &'static str },

    #[error("❌ Invalid value for `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("❌ Message IDs must be numeric.")]
    NonNumericId,
}

impl CommandError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}

/// The commands registered with Discord on startup.
#[must_use]
pub fn application_commands() -> Vec<ApplicationCommand> {
    let site = Provider::ALL.into_iter().fold(
        CommandOptionSpec::new(CommandOptionType::String, "site", "Image board to search"),
        |option, provider| option.choice(provider.name(), provider.name()),
    );

    let search = CommandOptionSpec::new(
        CommandOptionType::SubCommand,
        SEARCH_SUBCOMMAND,
        "Random images from danbooru, safebooru or rule34",
    )
    .option(
        CommandOptionSpec::new(
            CommandOptionType::String,
            "tag1",
            "First tag (e.g. yuzu (blue archive))",
        )
        .required(),
    )
    .option(CommandOptionSpec::new(
        CommandOptionType::String,
        "tag2",
        "Second tag",
    ))
    .option(site)
    .option(CommandOptionSpec::new(
        CommandOptionType::Integer,
        "count",
        "Number of images (1 to 10)",
    ));

    vec![
        ApplicationCommand::chat_input(IMAGE_COMMAND, "Image commands").option(search),
        ApplicationCommand::chat_input(PURGE_COMMAND, "Bulk delete messages")
            .option(
                CommandOptionSpec::new(
                    CommandOptionType::String,
                    "start_message_id",
                    "First message to delete",
                )
                .required(),
            )
            .option(
                CommandOptionSpec::new(
                    CommandOptionType::String,
                    "end_message_id",
                    "Last message to delete",
                )
                .required(),
            )
            .option(CommandOptionSpec::new(
                CommandOptionType::String,
                "author_id",
                "Only delete messages from this user",
            )),
    ]
}

/// Raw `/purge` options. IDs stay as text until the reply has been deferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeOptions {
    /// `start_message_id` as typed.
    pub start_message_id: String,
    /// `end_message_id` as typed.
    pub end_message_id: String,
    /// `author_id` as typed, if given.
    pub author_id: Option<String>,
}

impl PurgeOptions {
    /// Builds the purge request for `channel_id`.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::NonNumericId` if any ID is not an integer.
    pub fn into_request(self, channel_id: ChannelId) -> Result<PurgeRequest, CommandError> {
        let start: MessageId = self
            .start_message_id
            .parse()
            .map_err(|_| CommandError::NonNumericId)?;
        let end: MessageId = self
            .end_message_id
            .parse()
            .map_err(|_| CommandError::NonNumericId)?;

        let request = PurgeRequest::new(channel_id, start, end);
        match self.author_id.as_deref().map(str::trim) {
            None | Some("") => Ok(request),
            Some(author) => author
                .parse::<UserId>()
                .map(|author| request.from_author(author))
                .map_err(|_| CommandError::NonNumericId),
        }
    }
}

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// `/image search`.
    ImageSearch(SearchRequest),
    /// `/purge`.
    Purge(PurgeOptions),
}

impl BotCommand {
    /// Reads the invoked command and its options.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` for unknown commands and missing or mistyped options.
    pub fn parse(data: &CommandData, default_provider: Provider) -> Result<Self, CommandError> {
        match data.name.as_str() {
            IMAGE_COMMAND => {
                let sub = data
                    .subcommand()
                    .filter(|sub| sub.name == SEARCH_SUBCOMMAND)
                    .ok_or_else(|| CommandError::UnknownCommand {
                        name: data.name.clone(),
                    })?;
                parse_search(&sub.options, default_provider).map(Self::ImageSearch)
            }
            PURGE_COMMAND => Ok(Self::Purge(PurgeOptions {
                start_message_id: required_string(&data.options, "start_message_id")?,
                end_message_id: required_string(&data.options, "end_message_id")?,
                author_id: optional_string(&data.options, "author_id")?,
            })),
            other => Err(CommandError::UnknownCommand {
                name: other.to_string(),
            }),
        }
    }
}

fn parse_search(
    options: &[CommandOption],
    default_provider: Provider,
) -> Result<SearchRequest, CommandError> {
    let mut request = SearchRequest::new(required_string(options, "tag1")?)
        .with_provider(default_provider);

    if let Some(tag2) = optional_string(options, "tag2")? {
        request = request.with_secondary(tag2);
    }

    if let Some(site) = optional_string(options, "site")? {
        let provider = site
            .parse::<Provider>()
            .map_err(|e| CommandError::invalid("site", e.to_string()))?;
        request = request.with_provider(provider);
    }

    match find(options, "count") {
        None => {}
        Some(OptionValue::Integer(count)) => request = request.with_count(*count),
        Some(_) => return Err(CommandError::invalid("count", "expected an integer")),
    }

    Ok(request)
}

fn find<'a>(options: &'a [CommandOption], name: &str) -> Option<&'a OptionValue> {
    options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| o.value.as_ref())
}

fn optional_string(
    options: &[CommandOption],
    name: &'static str,
) -> Result<Option<String>, CommandError> {
    match find(options, name) {
        None => Ok(None),
        Some(OptionValue::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(CommandError::invalid(name, "expected text")),
    }
}

fn required_string(options: &[CommandOption], name: &'static str) -> Result<String, CommandError> {
    optional_string(options, name)?.ok_or(CommandError::MissingOption { name })
}
