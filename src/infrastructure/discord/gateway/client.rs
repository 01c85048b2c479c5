use std::time::Duration;

use futures_util::FutureExt;
use rand::Rng;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::connection::{GatewayConnectionHandler, WebSocketConnection};
use super::constants::{
    GatewayIntents, MAX_RECONNECT_ATTEMPTS, RECONNECT_DELAY_BASE, RECONNECT_DELAY_MAX,
    RECONNECT_JITTER_MAX,
};
use super::error::{GatewayError, GatewayResult};
use super::events::GatewayEventKind;
use super::session::SessionInfo;
use crate::domain::entities::BotToken;

/// Gateway task settings.
pub struct GatewayClientConfig {
    /// Intents sent with Identify.
    pub intents: GatewayIntents,
    /// Reconnect after recoverable disconnects.
    pub auto_reconnect: bool,
    /// Consecutive failed reconnects before giving up.
    pub max_reconnect_attempts: u32,
}

impl Default for GatewayClientConfig {
    fn default() -> Self {
        Self {
            intents: GatewayIntents::default_bot(),
            auto_reconnect: true,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
        }
    }
}

/// Owns the background gateway task.
pub struct GatewayClient {
    config: GatewayClientConfig,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl GatewayClient {
    /// Creates an idle client.
    #[must_use]
    pub fn new(config: GatewayClientConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            shutdown_tx,
            task: None,
        }
    }

    /// Creates an idle client with default settings.
    #[must_use]
    pub fn with_default_config() -> Self {
        Self::new(GatewayClientConfig::default())
    }

    /// Spawns the gateway task and returns its event stream.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::AlreadyRunning` if the task is still alive.
    pub fn connect(
        &mut self,
        token: &BotToken,
    ) -> GatewayResult<mpsc::UnboundedReceiver<GatewayEventKind>> {
        if self.is_running() {
            return Err(GatewayError::AlreadyRunning);
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.shutdown_tx.send_replace(false);

        let config = GatewayLoopConfig {
            token: token.as_str().to_string(),
            intents: self.config.intents,
            auto_reconnect: self.config.auto_reconnect,
            max_attempts: self.config.max_reconnect_attempts,
        };
        let shutdown_rx = self.shutdown_tx.subscribe();

        self.task = Some(tokio::spawn(async move {
            let result = std::panic::AssertUnwindSafe(run_gateway_loop(
                config,
                event_tx.clone(),
                shutdown_rx,
            ));

            if let Err(panic_info) = result.catch_unwind().await {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    (*s).to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };

                error!(panic = %panic_msg, "Gateway task panicked");
                let _ = event_tx.send(GatewayEventKind::Error {
                    message: format!("Gateway task panicked: {panic_msg}"),
                    recoverable: false,
                });
            }
        }));

        Ok(event_rx)
    }

    /// Asks the gateway task to close the connection and stop.
    pub fn disconnect(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Stops the gateway task and waits for it to finish.
    pub async fn shutdown(&mut self) {
        self.disconnect();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "Gateway task ended abnormally");
        }
    }

    /// Whether the gateway task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

struct GatewayLoopConfig {
    token: String,
    intents: GatewayIntents,
    auto_reconnect: bool,
    max_attempts: u32,
}

async fn run_gateway_loop(
    config: GatewayLoopConfig,
    event_tx: mpsc::UnboundedSender<GatewayEventKind>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut reconnect_attempts: u32 = 0;
    let mut session = SessionInfo::new();

    while !*shutdown.borrow() {
        let mut handler = GatewayConnectionHandler::new(
            Box::new(WebSocketConnection::new()),
            config.token.clone(),
            config.intents,
            session,
            event_tx.clone(),
        );

        let result = match handler.connect().await {
            Ok(()) => handler.run(&mut shutdown).await,
            Err(e) => Err(e),
        };
        let reached_ready = handler.established();
        session = handler.into_session();

        let Err(e) = result else {
            break;
        };

        if reached_ready {
            reconnect_attempts = 0;
        }

        let can_resume = handle_connection_error(&e, &event_tx, &mut session);

        if !e.should_reconnect() || !config.auto_reconnect {
            error!(error = %e, "Gateway connection lost for good");
            let _ = event_tx.send(GatewayEventKind::Error {
                message: e.to_string(),
                recoverable: false,
            });
            break;
        }

        reconnect_attempts += 1;
        if reconnect_attempts > config.max_attempts {
            error!(
                attempts = reconnect_attempts - 1,
                "Max reconnection attempts exceeded"
            );
            let _ = event_tx.send(GatewayEventKind::Error {
                message: format!(
                    "Max reconnection attempts ({}) exceeded",
                    config.max_attempts
                ),
                recoverable: false,
            });
            break;
        }

        let delay = calculate_backoff_delay(reconnect_attempts - 1, &mut rand::thread_rng());
        info!(
            attempt = reconnect_attempts,
            can_resume,
            delay_ms = delay.as_millis(),
            "Reconnecting to gateway"
        );

        let _ = event_tx.send(GatewayEventKind::Reconnecting {
            attempt: reconnect_attempts,
        });

        tokio::select! {
            () = sleep(delay) => {}
            _ = shutdown.changed() => {}
        }
    }

    info!("Gateway loop terminated");
}

/// Reports the disconnect and drops resume data the error invalidated.
fn handle_connection_error(
    error: &GatewayError,
    event_tx: &mpsc::UnboundedSender<GatewayEventKind>,
    session: &mut SessionInfo,
) -> bool {
    warn!(error = %error, close_code = ?error.close_code(), "Connection error");

    let can_resume = error.can_resume() && session.can_resume();
    if !can_resume {
        session.clear();
    }

    let _ = event_tx.send(GatewayEventKind::Disconnected {
        reason: error.to_string(),
        can_resume,
    });

    can_resume
}

#[allow(clippy::cast_possible_truncation)]
fn calculate_backoff_delay<R: Rng + ?Sized>(attempt: u32, rng: &mut R) -> Duration {
    let base_delay = RECONNECT_DELAY_BASE.as_millis() as u64;
    let max_delay = RECONNECT_DELAY_MAX.as_millis() as u64;
    let jitter_max = RECONNECT_JITTER_MAX.as_millis() as u64;

    let exponential_delay = base_delay.saturating_mul(2_u64.saturating_pow(attempt.min(6)));
    let capped_delay = exponential_delay.min(max_delay);

    Duration::from_millis(capped_delay.saturating_add(rng.gen_range(0..jitter_max)))
}
