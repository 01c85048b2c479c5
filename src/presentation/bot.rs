//! Bot run loop: gateway events in, one task per interaction out.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::commands::application_commands;
use super::handler::InteractionHandler;
use crate::domain::entities::{ApplicationId, BotToken};
use crate::domain::ports::DiscordPort;
use crate::infrastructure::discord::{DispatchEvent, GatewayClient, GatewayError, GatewayEventKind};

/// Connects the gateway to the interaction handler.
pub struct Bot {
    gateway: GatewayClient,
    discord: Arc<dyn DiscordPort>,
    handler: InteractionHandler,
    register_on_ready: bool,
}

impl Bot {
    /// Creates a bot. `register_on_ready` overwrites the global commands on every `READY`.
    #[must_use]
    pub fn new(
        gateway: GatewayClient,
        discord: Arc<dyn DiscordPort>,
        handler: InteractionHandler,
        register_on_ready: bool,
    ) -> Self {
        Self {
            gateway,
            discord,
            handler,
            register_on_ready,
        }
    }

    /// Runs until Ctrl-C or until the gateway gives up.
    ///
    /// In-flight interactions are allowed to finish before returning.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the gateway cannot be started or stops for good.
    pub async fn run(mut self, token: &BotToken) -> Result<(), GatewayError> {
        let mut events = self.gateway.connect(token)?;
        let mut tasks = JoinSet::new();
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        let outcome = loop {
            tokio::select! {
                result = &mut shutdown => {
                    if let Err(e) = result {
                        warn!(error = %e, "Failed to listen for Ctrl-C");
                    }
                    info!("Shutdown requested");
                    break Ok(());
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        break Ok(());
                    };
                    if let Err(e) = self.handle_event(event, &mut tasks) {
                        break Err(e);
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Interaction task failed");
                    }
                }
            }
        };

        self.gateway.shutdown().await;
        if !tasks.is_empty() {
            info!(pending = tasks.len(), "Waiting for in-flight interactions");
        }
        while tasks.join_next().await.is_some() {}

        info!("Bot stopped");
        outcome
    }

    fn handle_event(
        &self,
        event: GatewayEventKind,
        tasks: &mut JoinSet<()>,
    ) -> Result<(), GatewayError> {
        match event {
            GatewayEventKind::Dispatch(DispatchEvent::Ready {
                application_id,
                user_id,
                username,
                ..
            }) => {
                info!(%username, %user_id, %application_id, "✅ Bot logged in");
                if self.register_on_ready {
                    tasks.spawn(register_commands(Arc::clone(&self.discord), application_id));
                }
            }
            GatewayEventKind::Dispatch(DispatchEvent::InteractionCreate(interaction)) => {
                let handler = self.handler.clone();
                tasks.spawn(async move { handler.handle(*interaction).await });
            }
            GatewayEventKind::Dispatch(DispatchEvent::Resumed) | GatewayEventKind::Resumed => {
                info!("Gateway session resumed");
            }
            GatewayEventKind::Dispatch(DispatchEvent::Unknown { event_type }) => {
                debug!(%event_type, "Ignoring dispatch");
            }
            GatewayEventKind::Connected { session_id } => {
                debug!(%session_id, "Gateway connected");
            }
            GatewayEventKind::Disconnected { reason, can_resume } => {
                warn!(%reason, can_resume, "Gateway disconnected");
            }
            GatewayEventKind::Reconnecting { attempt } => {
                info!(attempt, "Gateway reconnecting");
            }
            GatewayEventKind::HeartbeatAck { latency_ms } => {
                debug!(latency_ms, "Heartbeat acknowledged");
            }
            GatewayEventKind::Error {
                message,
                recoverable: true,
            } => warn!(%message, "Gateway error"),
            GatewayEventKind::Error {
                message,
                recoverable: false,
            } => return Err(GatewayError::connection_failed(message)),
        }
        Ok(())
    }
}

async fn register_commands(discord: Arc<dyn DiscordPort>, application_id: ApplicationId) {
    let commands = application_commands();
    match discord.register_commands(application_id, &commands).await {
        Ok(()) => info!(count = commands.len(), "Registered slash commands"),
        Err(e) => error!(error = %e, "Failed to register slash commands"),
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::application::services::ImageFetchService;
    use crate::application::use_cases::{PurgeMessagesUseCase, SearchImagesUseCase};
    use crate::domain::entities::{
        ChannelId, CommandData, Interaction, InteractionHandle, InteractionId, InteractionKind,
        InteractionToken, Provider, UserId,
    };
    use crate::domain::errors::DiscordError;
    use crate::domain::ports::mocks::{MockDiscordPort, MockImageBoardPort};

    fn bot(discord: MockDiscordPort, register_on_ready: bool) -> Bot {
        let discord: Arc<dyn DiscordPort> = Arc::new(discord);
        let handler = InteractionHandler::new(
            Arc::clone(&discord),
            SearchImagesUseCase::new(ImageFetchService::new(Arc::new(MockImageBoardPort::new()))),
            PurgeMessagesUseCase::new(Arc::clone(&discord)),
            Provider::Danbooru,
        );
        Bot::new(
            GatewayClient::with_default_config(),
            discord,
            handler,
            register_on_ready,
        )
    }

    fn ready() -> GatewayEventKind {
        GatewayEventKind::Dispatch(DispatchEvent::Ready {
            session_id: "sess".into(),
            resume_gateway_url: None,
            application_id: ApplicationId(99),
            user_id: UserId(5),
            username: "boorubot".into(),
        })
    }

    async fn drain(tasks: &mut JoinSet<()>) {
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap();
        }
    }

    #[tokio::test]
    async fn test_ready_registers_commands() {
        let mut discord = MockDiscordPort::new();
        discord
            .expect_register_commands()
            .withf(|application_id, commands| {
                *application_id == ApplicationId(99)
                    && commands.iter().map(|c| c.name.as_str()).eq(["image", "purge"])
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let bot = bot(discord, true);
        let mut tasks = JoinSet::new();
        bot.handle_event(ready(), &mut tasks).unwrap();
        drain(&mut tasks).await;
    }

    #[tokio::test]
    async fn test_registration_can_be_disabled() {
        let mut discord = MockDiscordPort::new();
        discord.expect_register_commands().never();

        let bot = bot(discord, false);
        let mut tasks = JoinSet::new();
        bot.handle_event(ready(), &mut tasks).unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_registration_failure_is_logged() {
        let mut discord = MockDiscordPort::new();
        discord
            .expect_register_commands()
            .with(eq(ApplicationId(99)), mockall::predicate::always())
            .returning(|_, _| {
                Err(DiscordError::Unauthorized {
                    message: "bad token".into(),
                })
            });

        let bot = bot(discord, true);
        let mut tasks = JoinSet::new();
        bot.handle_event(ready(), &mut tasks).unwrap();
        drain(&mut tasks).await;
    }

    #[tokio::test]
    async fn test_interaction_runs_on_its_own_task() {
        let mut discord = MockDiscordPort::new();
        discord
            .expect_reply()
            .withf(|_, content, _| content == "Unknown command.")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let interaction = Interaction {
            handle: InteractionHandle {
                id: InteractionId(1),
                application_id: ApplicationId(99),
                token: InteractionToken::new("tok"),
            },
            kind: InteractionKind::ApplicationCommand,
            channel_id: Some(ChannelId(3)),
            guild_id: None,
            user_id: None,
            member_permissions: None,
            data: Some(CommandData {
                name: "ping".into(),
                options: Vec::new(),
            }),
        };

        let bot = bot(discord, true);
        let mut tasks = JoinSet::new();
        bot.handle_event(
            GatewayEventKind::Dispatch(DispatchEvent::InteractionCreate(Box::new(interaction))),
            &mut tasks,
        )
        .unwrap();
        assert_eq!(tasks.len(), 1);
        drain(&mut tasks).await;
    }

    #[tokio::test]
    async fn test_fatal_gateway_error_stops_bot() {
        let bot = bot(MockDiscordPort::new(), true);
        let mut tasks = JoinSet::new();

        let result = bot.handle_event(
            GatewayEventKind::Error {
                message: "Authentication failed".into(),
                recoverable: false,
            },
            &mut tasks,
        );

        assert!(matches!(result, Err(GatewayError::ConnectionFailed { .. })));
        assert!(
            bot.handle_event(
                GatewayEventKind::Reconnecting { attempt: 1 },
                &mut tasks
            )
            .is_ok()
        );
    }
}
