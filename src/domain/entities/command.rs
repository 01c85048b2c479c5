//! Application command definitions registered with Discord.

use serde::{Serialize, Serializer};

/// Option type codes from the application command API.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CommandOptionType {
    SubCommand = 1,
    SubCommandGroup = 2,
    String = 3,
    Integer = 4,
    Boolean = 5,
    User = 6,
}

impl Serialize for CommandOptionType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}

/// A fixed choice offered for a string option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionChoice {
    /// Label shown to the user.
    pub name: String,
    /// Value delivered with the interaction.
    pub value: String,
}

/// Definition of a command option or subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOptionSpec {
    /// Option type code.
    #[serde(rename = "type")]
    pub kind: CommandOptionType,
    /// Lowercase option name.
    pub name: String,
    /// Help text shown in the client.
    pub description: String,
    /// Whether Discord enforces the option.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Fixed choices for string options.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,
    /// Nested options of a subcommand.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionSpec>,
}

impl CommandOptionSpec {
    /// Creates an optional option without choices.
    #[must_use]
    pub fn new(
        kind: CommandOptionType,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            required: false,
            choices: Vec::new(),
            options: Vec::new(),
        }
    }

    /// Marks the option as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Adds a fixed choice.
    #[must_use]
    pub fn choice(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.choices.push(OptionChoice {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Adds a nested option.
    #[must_use]
    pub fn option(mut self, option: Self) -> Self {
        self.options.push(option);
        self
    }
}

/// A top-level slash command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationCommand {
    /// Command name typed after the slash.
    pub name: String,
    /// Help text shown in the client.
    pub description: String,
    /// Always 1 (`CHAT_INPUT`).
    #[serde(rename = "type")]
    pub kind: u8,
    /// Subcommands or options.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionSpec>,
}

impl ApplicationCommand {
    /// Creates a chat-input (slash) command.
    #[must_use]
    pub fn chat_input(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: 1,
            options: Vec::new(),
        }
    }

    /// Adds a subcommand or option.
    #[must_use]
    pub fn option(mut self, option: CommandOptionSpec) -> Self {
        self.options.push(option);
        self
    }
}
