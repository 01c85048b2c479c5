use crate::domain::entities::{ApplicationId, Interaction, UserId};

/// Connection lifecycle and dispatch events emitted by the gateway client.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum GatewayEventKind {
    /// Identify was accepted with a `READY`.
    Connected {
        session_id: String,
    },
    /// The connection dropped.
    Disconnected {
        reason: String,
        can_resume: bool,
    },
    /// A reconnect attempt is starting.
    Reconnecting {
        attempt: u32,
    },
    /// A resume was accepted.
    Resumed,
    /// The previous heartbeat was acknowledged.
    HeartbeatAck {
        latency_ms: u64,
    },
    /// A dispatch (opcode 0) payload.
    Dispatch(DispatchEvent),
    /// The gateway failed. Not recoverable means the task has stopped.
    Error {
        message: String,
        recoverable: bool,
    },
}

/// Dispatch events the bot reacts to.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum DispatchEvent {
    /// Session established.
    Ready {
        session_id: String,
        resume_gateway_url: Option<String>,
        application_id: ApplicationId,
        user_id: UserId,
        username: String,
    },
    /// Session resumed.
    Resumed,
    /// A slash command or other interaction.
    InteractionCreate(Box<Interaction>),
    /// Any other dispatch, ignored.
    Unknown {
        event_type: String,
    },
}

impl DispatchEvent {
    /// Dispatch `t` name.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Ready { .. } => "READY",
            Self::Resumed => "RESUMED",
            Self::InteractionCreate(_) => "INTERACTION_CREATE",
            Self::Unknown { .. } => "UNKNOWN",
        }
    }
}
