//! Slash-command interaction entity.

use std::fmt;

use super::{ApplicationId, ChannelId, GuildId, InteractionId, Permissions, UserId};

/// Short-lived token that authorizes responses to one interaction.
#[derive(Clone, PartialEq, Eq)]
pub struct InteractionToken(String);

impl InteractionToken {
    /// Wraps a raw interaction token.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token for use in request paths.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for InteractionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InteractionToken(***)")
    }
}

/// Everything needed to answer an interaction over REST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionHandle {
    /// Interaction id used by the initial callback.
    pub id: InteractionId,
    /// Application id used by follow-up webhooks.
    pub application_id: ApplicationId,
    /// Token authorizing the responses.
    pub token: InteractionToken,
}

/// Who can see a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Visible to everyone in the channel.
    #[default]
    Public,
    /// Only visible to the invoking user.
    Ephemeral,
}

impl Visibility {
    /// Message flag bit for ephemeral replies.
    pub const EPHEMERAL_FLAG: u64 = 1 << 6;

    /// Returns the message flags for this visibility.
    #[must_use]
    pub const fn flags(self) -> Option<u64> {
        match self {
            Self::Public => None,
            Self::Ephemeral => Some(Self::EPHEMERAL_FLAG),
        }
    }
}

/// Interaction type as reported by Discord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum InteractionKind {
    Ping,
    ApplicationCommand,
    MessageComponent,
    Autocomplete,
    ModalSubmit,
    Other(u8),
}

impl From<u8> for InteractionKind {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Ping,
            2 => Self::ApplicationCommand,
            3 => Self::MessageComponent,
            4 => Self::Autocomplete,
            5 => Self::ModalSubmit,
            other => Self::Other(other),
        }
    }
}

/// Value supplied for a command option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// String option, also used for snowflake ids.
    String(String),
    /// Integer option.
    Integer(i64),
    /// Floating point option.
    Number(f64),
    /// Boolean option.
    Boolean(bool),
}

/// One option of an invoked command. Subcommands carry nested options.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOption {
    /// Option name.
    pub name: String,
    /// Supplied value. `None` for subcommands.
    pub value: Option<OptionValue>,
    /// Nested options of a subcommand.
    pub options: Vec<CommandOption>,
}

impl CommandOption {
    /// Looks up a nested option by name.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&Self> {
        self.options.iter().find(|o| o.name == name)
    }
}

/// The command that was invoked and its options.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandData {
    /// Name of the invoked command.
    pub name: String,
    /// Top-level options or the invoked subcommand.
    pub options: Vec<CommandOption>,
}

impl CommandData {
    /// Looks up a top-level option by name.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&CommandOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Returns the invoked subcommand, if any.
    #[must_use]
    pub fn subcommand(&self) -> Option<&CommandOption> {
        self.options.iter().find(|o| o.value.is_none())
    }
}

/// A slash-command invocation delivered over the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    /// Handle for answering the interaction.
    pub handle: InteractionHandle,
    /// Interaction type.
    pub kind: InteractionKind,
    /// Channel the command was used in.
    pub channel_id: Option<ChannelId>,
    /// Guild the command was used in.
    pub guild_id: Option<GuildId>,
    /// Invoking user, from the member or user object.
    pub user_id: Option<UserId>,
    /// Resolved permissions of the invoking member. `None` outside guilds.
    pub member_permissions: Option<Permissions>,
    /// Invoked command. Only set for application commands.
    pub data: Option<CommandData>,
}
