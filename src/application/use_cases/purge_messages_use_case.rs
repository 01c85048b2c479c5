//! Message purge use case.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::dto::{PurgeReport, PurgeRequest};
use crate::domain::entities::MessageId;
use crate::domain::errors::DiscordError;
use crate::domain::ports::{DiscordPort, FetchMessagesOptions};

/// Deletes channel messages inside an ID range.
///
/// Only one page of history is scanned, starting right after the lower
/// bound. Individual delete failures are counted, not propagated.
#[derive(Clone)]
pub struct PurgeMessagesUseCase {
    discord: Arc<dyn DiscordPort>,
}

impl PurgeMessagesUseCase {
    /// Creates new purge use case.
    #[must_use]
    pub fn new(discord: Arc<dyn DiscordPort>) -> Self {
        Self { discord }
    }

    /// Runs the purge.
    ///
    /// # Errors
    ///
    /// Returns an error only when channel history cannot be fetched.
    pub async fn execute(&self, request: PurgeRequest) -> Result<PurgeReport, DiscordError> {
        let (low, high) = request.bounds();
        let options = FetchMessagesOptions::default()
            .with_limit(FetchMessagesOptions::MAX_LIMIT)
            .after_message(MessageId(low.as_u64().saturating_sub(1)));

        let messages = self
            .discord
            .fetch_messages(request.channel_id, options)
            .await?;

        let mut report = PurgeReport {
            scanned: messages.len(),
            ..PurgeReport::default()
        };

        for message in messages.iter().filter(|m| request.matches(m)) {
            match self
                .discord
                .delete_message(request.channel_id, message.id())
                .await
            {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    warn!(message_id = %message.id(), error = %e, "Failed to delete message");
                    report.failed += 1;
                }
            }
        }

        debug!(low = %low, high = %high, scanned = report.scanned, "Purge scan finished");
        info!(
            channel_id = %request.channel_id,
            deleted = report.deleted,
            failed = report.failed,
            "Purge complete"
        );

        Ok(report)
    }
}
