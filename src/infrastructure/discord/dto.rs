use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{ChannelId, Message, MessageId, UserId};

/// Interaction callback type: reply with a message now.
pub const CALLBACK_CHANNEL_MESSAGE: u8 = 4;
/// Interaction callback type: acknowledge now, follow up later.
pub const CALLBACK_DEFERRED_CHANNEL_MESSAGE: u8 = 5;

/// Discord API message author.
#[derive(Debug, Deserialize)]
pub struct AuthorResponse {
    /// Discord user ID.
    pub id: UserId,
}

/// Discord API message, trimmed to the fields the bot reads.
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub author: AuthorResponse,
    pub timestamp: DateTime<Utc>,
}

impl From<MessageResponse> for Message {
    fn from(response: MessageResponse) -> Self {
        Self::new(
            response.id,
            response.channel_id,
            response.author.id,
            response.timestamp,
        )
    }
}

/// Message body for replies and follow-ups.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct MessagePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

/// Body of `POST /interactions/{id}/{token}/callback`.
#[derive(Debug, Serialize)]
pub struct InteractionCallback<'a> {
    #[serde(rename = "type")]
    pub kind: u8,
    pub data: MessagePayload<'a>,
}

/// Discord API error response structure.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error message from Discord.
    pub message: String,
    /// Seconds to wait, present on 429 responses.
    #[serde(default)]
    pub retry_after: Option<f64>,
}
