//! Purge DTOs.

use std::fmt;

use crate::domain::entities::{ChannelId, Message, MessageId, UserId};

/// Delete messages in an inclusive ID range, optionally from one author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeRequest {
    /// Channel to purge.
    pub channel_id: ChannelId,
    /// One end of the range.
    pub start: MessageId,
    /// The other end of the range.
    pub end: MessageId,
    /// Only delete messages from this user.
    pub author: Option<UserId>,
}

impl PurgeRequest {
    /// Creates a request for every author in the range.
    #[must_use]
    pub const fn new(channel_id: ChannelId, start: MessageId, end: MessageId) -> Self {
        Self {
            channel_id,
            start,
            end,
            author: None,
        }
    }

    /// Limits the purge to one author.
    #[must_use]
    pub const fn from_author(mut self, author: UserId) -> Self {
        self.author = Some(author);
        self
    }

    /// Range bounds, lowest first. The endpoints may be given in any order.
    #[must_use]
    pub fn bounds(&self) -> (MessageId, MessageId) {
        (self.start.min(self.end), self.start.max(self.end))
    }

    /// Whether `message` falls inside the range and matches the author filter.
    #[must_use]
    pub fn matches(&self, message: &Message) -> bool {
        let (low, high) = self.bounds();
        let in_range = message.id() >= low && message.id() <= high;
        in_range && self.author.is_none_or(|author| message.author_id() == author)
    }
}

/// Counts reported back after a purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Messages inspected from channel history.
    pub scanned: usize,
    /// Messages deleted.
    pub deleted: usize,
    /// Delete requests that failed.
    pub failed: usize,
}

impl fmt::Display for PurgeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "🧹 Purge complete\nDeleted: {}\nFailed: {}",
            self.deleted, self.failed
        )
    }
}
