//! Routes slash-command interactions to the use cases.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::commands::{BotCommand, PurgeOptions};
use crate::application::dto::SearchRequest;
use crate::application::use_cases::{PurgeMessagesUseCase, SearchImagesUseCase};
use crate::domain::entities::{
    Interaction, InteractionHandle, InteractionKind, Provider, Visibility,
};
use crate::domain::errors::DiscordError;
use crate::domain::ports::DiscordPort;

/// Reply when the invoker lacks Manage Messages.
pub const MISSING_PERMISSION: &str = "❌ Manage Messages permission is required.";
/// Reply when the interaction has no channel.
pub const NOT_IN_CHANNEL: &str = "❌ This command can only be used in a channel.";

/// Answers interactions. Cheap to clone, one clone per spawned task.
#[derive(Clone)]
pub struct InteractionHandler {
    discord: Arc<dyn DiscordPort>,
    search: SearchImagesUseCase,
    purge: PurgeMessagesUseCase,
    default_provider: Provider,
}

impl InteractionHandler {
    /// Creates a handler. `default_provider` is searched when `site` is omitted.
    #[must_use]
    pub fn new(
        discord: Arc<dyn DiscordPort>,
        search: SearchImagesUseCase,
        purge: PurgeMessagesUseCase,
        default_provider: Provider,
    ) -> Self {
        Self {
            discord,
            search,
            purge,
            default_provider,
        }
    }

    /// Handles one interaction. Discord errors are logged, never returned.
    pub async fn handle(&self, interaction: Interaction) {
        if interaction.kind != InteractionKind::ApplicationCommand {
            debug!(kind = ?interaction.kind, "Ignoring non-command interaction");
            return;
        }
        let Some(data) = interaction.data.as_ref() else {
            debug!(id = %interaction.handle.id, "Command interaction without data");
            return;
        };

        info!(
            command = %data.name,
            user_id = ?interaction.user_id,
            guild_id = ?interaction.guild_id,
            "Handling command"
        );

        match BotCommand::parse(data, self.default_provider) {
            Ok(BotCommand::ImageSearch(request)) => {
                self.image_search(&interaction.handle, request).await;
            }
            Ok(BotCommand::Purge(options)) => self.purge(&interaction, options).await,
            Err(e) => {
                debug!(error = ?e, "Rejected command");
                let result = self
                    .discord
                    .reply(&interaction.handle, &e.to_string(), Visibility::Ephemeral)
                    .await;
                log_failure(result, "reply");
            }
        }
    }

    async fn image_search(&self, handle: &InteractionHandle, request: SearchRequest) {
        if let Err(e) = self.discord.defer_reply(handle, Visibility::Public).await {
            warn!(error = %e, "Failed to defer image search");
            return;
        }

        let reply = self.search.execute(request).await;
        let result = self
            .discord
            .followup(handle, &reply.to_string(), Visibility::Public)
            .await;
        log_failure(result, "image search follow-up");
    }

    async fn purge(&self, interaction: &Interaction, options: PurgeOptions) {
        let handle = &interaction.handle;

        if !interaction
            .member_permissions
            .is_some_and(|p| p.can_manage_messages())
        {
            let result = self
                .discord
                .reply(handle, MISSING_PERMISSION, Visibility::Ephemeral)
                .await;
            log_failure(result, "permission denial");
            return;
        }

        let Some(channel_id) = interaction.channel_id else {
            let result = self
                .discord
                .reply(handle, NOT_IN_CHANNEL, Visibility::Ephemeral)
                .await;
            log_failure(result, "reply");
            return;
        };

        if let Err(e) = self.discord.defer_reply(handle, Visibility::Ephemeral).await {
            warn!(error = %e, "Failed to defer purge");
            return;
        }

        let content = match options.into_request(channel_id) {
            Ok(request) => match self.purge.execute(request).await {
                Ok(report) => report.to_string(),
                Err(e) => {
                    warn!(error = %e, %channel_id, "Purge failed");
                    format!("❌ Purge failed: {e}")
                }
            },
            Err(e) => e.to_string(),
        };

        let result = self
            .discord
            .followup(handle, &content, Visibility::Ephemeral)
            .await;
        log_failure(result, "purge follow-up");
    }
}

fn log_failure(result: Result<(), DiscordError>, action: &str) {
    if let Err(e) = result {
        warn!(error = %e, action, recoverable = e.is_recoverable(), "Discord request failed");
    }
}
