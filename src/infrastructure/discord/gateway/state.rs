use std::time::Instant;

/// Lifecycle stage of one gateway connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    WaitingForHello,
    Identifying,
    Resuming,
    Connected,
}

impl ConnectionState {
    /// Whether the handshake finished.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::WaitingForHello => write!(f, "Waiting for Hello"),
            Self::Identifying => write!(f, "Identifying"),
            Self::Resuming => write!(f, "Resuming"),
            Self::Connected => write!(f, "Connected"),
        }
    }
}

/// Per-connection bookkeeping: lifecycle stage and heartbeat timing.
#[derive(Debug, Default)]
pub struct GatewayState {
    connection: ConnectionState,
    heartbeat_interval_ms: Option<u64>,
    last_heartbeat_sent: Option<Instant>,
    awaiting_ack: bool,
    latency_ms: Option<u64>,
}

impl GatewayState {
    /// Fresh state for a new connection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            heartbeat_interval_ms: None,
            last_heartbeat_sent: None,
            awaiting_ack: false,
            latency_ms: None,
        }
    }

    /// Current lifecycle stage.
    #[must_use]
    pub const fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Moves to `state`. Disconnecting clears heartbeat tracking.
    pub const fn transition_to(&mut self, state: ConnectionState) {
        self.connection = state;
        if matches!(state, ConnectionState::Disconnected) {
            self.last_heartbeat_sent = None;
            self.awaiting_ack = false;
        }
    }

    /// Stores the interval from Hello.
    pub const fn set_heartbeat_interval(&mut self, interval_ms: u64) {
        self.heartbeat_interval_ms = Some(interval_ms);
    }

    /// Interval from Hello, once received.
    #[must_use]
    pub const fn heartbeat_interval_ms(&self) -> Option<u64> {
        self.heartbeat_interval_ms
    }

    /// Marks a heartbeat as awaiting its ack.
    pub fn record_heartbeat_sent(&mut self) {
        self.last_heartbeat_sent = Some(Instant::now());
        self.awaiting_ack = true;
    }

    /// Clears the pending heartbeat and records latency.
    #[allow(clippy::cast_possible_truncation)]
    pub fn record_heartbeat_ack(&mut self) {
        if let Some(sent) = self.last_heartbeat_sent {
            self.latency_ms = Some(sent.elapsed().as_millis() as u64);
        }
        self.awaiting_ack = false;
    }

    /// True when the previous heartbeat was never acknowledged.
    #[must_use]
    pub const fn is_zombied(&self) -> bool {
        self.awaiting_ack
    }

    /// Round trip of the last acknowledged heartbeat.
    #[must_use]
    pub const fn latency_ms(&self) -> Option<u64> {
        self.latency_ms
    }
}
