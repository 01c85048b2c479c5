//! Discord REST port for replying to interactions and managing messages.

use async_trait::async_trait;

use crate::domain::entities::{
    ApplicationCommand, ApplicationId, ChannelId, InteractionHandle, Message, MessageId,
    Visibility,
};
use crate::domain::errors::DiscordError;

/// Options for fetching messages from a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchMessagesOptions {
    /// Page size, capped at `MAX_LIMIT`.
    pub limit: Option<u8>,
    /// Only return messages older than this id.
    pub before: Option<MessageId>,
    /// Only return messages newer than this id.
    pub after: Option<MessageId>,
}

impl FetchMessagesOptions {
    /// Largest page Discord returns.
    pub const MAX_LIMIT: u8 = 100;

    /// Sets the page size.
    #[must_use]
    pub const fn with_limit(mut self, limit: u8) -> Self {
        self.limit = Some(if limit < Self::MAX_LIMIT {
            limit
        } else {
            Self::MAX_LIMIT
        });
        self
    }

    /// Fetches messages after the given id.
    #[must_use]
    pub const fn after_message(mut self, message_id: MessageId) -> Self {
        self.after = Some(message_id);
        self
    }
}

/// Port for the Discord operations the bot performs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiscordPort: Send + Sync {
    /// Replaces the application's global slash commands.
    async fn register_commands(
        &self,
        application_id: ApplicationId,
        commands: &[ApplicationCommand],
    ) -> Result<(), DiscordError>;

    /// Acknowledges an interaction, promising a follow-up.
    async fn defer_reply(
        &self,
        handle: &InteractionHandle,
        visibility: Visibility,
    ) -> Result<(), DiscordError>;

    /// Answers an interaction immediately.
    async fn reply(
        &self,
        handle: &InteractionHandle,
        content: &str,
        visibility: Visibility,
    ) -> Result<(), DiscordError>;

    /// Sends a follow-up message for a deferred interaction.
    async fn followup(
        &self,
        handle: &InteractionHandle,
        content: &str,
        visibility: Visibility,
    ) -> Result<(), DiscordError>;

    /// Fetches one page of channel history.
    async fn fetch_messages(
        &self,
        channel_id: ChannelId,
        options: FetchMessagesOptions,
    ) -> Result<Vec<Message>, DiscordError>;

    /// Deletes a single message.
    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), DiscordError>;
}
