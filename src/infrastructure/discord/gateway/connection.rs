use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace, warn};

use super::codec::{EventParser, GatewayCodec};
use super::constants::{
    CONNECTION_TIMEOUT, GATEWAY_URL, GatewayIntents, GatewayOpcode, HELLO_TIMEOUT,
};
use super::error::{GatewayError, GatewayResult};
use super::events::{DispatchEvent, GatewayEventKind};
use super::heartbeat::HeartbeatManager;
use super::payloads::{GatewayMessage, GatewayPayload};
use super::session::SessionInfo;
use super::state::{ConnectionState, GatewayState};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, WsMessage>;
type WsReader = SplitStream<WsStream>;

/// Transport for gateway payloads.
#[async_trait]
pub trait GatewayConnection: Send + Sync {
    /// Opens the connection, on `gateway_url` when resuming.
    async fn connect(&mut self, gateway_url: Option<&str>) -> GatewayResult<()>;
    /// Closes the connection.
    async fn disconnect(&mut self) -> GatewayResult<()>;
    /// Sends one payload.
    async fn send(&mut self, payload: &GatewayPayload) -> GatewayResult<()>;
    /// Next message, `None` once the peer has closed.
    async fn receive(&mut self) -> GatewayResult<Option<GatewayMessage>>;
    /// Whether the connection is open.
    fn is_connected(&self) -> bool;
}

pub struct WebSocketConnection {
    writer: Option<WsWriter>,
    reader: Option<WsReader>,
    codec: GatewayCodec,
    connected: bool,
}

impl WebSocketConnection {
    #[must_use]
    pub fn new() -> Self {
        Self {
            writer: None,
            reader: None,
            codec: GatewayCodec::new(),
            connected: false,
        }
    }
}

impl Default for WebSocketConnection {
    fn default() -> Self {
        Self::new()
    }
}

/// Resume URLs come without query parameters; the version and
/// compression settings must be re-applied.
fn with_gateway_query(url: &str) -> String {
    match GATEWAY_URL.split_once('?') {
        Some((_, query)) if !url.contains('?') => {
            format!("{}/?{query}", url.trim_end_matches('/'))
        }
        _ => url.to_string(),
    }
}

#[async_trait]
impl GatewayConnection for WebSocketConnection {
    async fn connect(&mut self, gateway_url: Option<&str>) -> GatewayResult<()> {
        let url = gateway_url.map_or_else(|| GATEWAY_URL.to_string(), with_gateway_query);
        debug!(url = %url, "Opening gateway websocket");

        let (ws_stream, _) = timeout(CONNECTION_TIMEOUT, connect_async(url.as_str()))
            .await
            .map_err(|_| GatewayError::timeout("connection"))?
            .map_err(|e| GatewayError::connection_failed(e.to_string()))?;

        let (writer, reader) = ws_stream.split();
        self.writer = Some(writer);
        self.reader = Some(reader);
        self.connected = true;
        self.codec.reset();

        Ok(())
    }

    async fn disconnect(&mut self) -> GatewayResult<()> {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.close().await;
        }
        self.reader = None;
        self.connected = false;
        self.codec.reset();
        debug!("WebSocket connection closed");
        Ok(())
    }

    async fn send(&mut self, payload: &GatewayPayload) -> GatewayResult<()> {
        let writer = self.writer.as_mut().ok_or(GatewayError::NotConnected)?;

        let json = serde_json::to_string(payload)
            .map_err(|e| GatewayError::serialization(e.to_string()))?;

        writer
            .send(WsMessage::Text(json.into()))
            .await
            .map_err(|e| GatewayError::websocket(e.to_string()))
    }

    async fn receive(&mut self) -> GatewayResult<Option<GatewayMessage>> {
        let reader = self.reader.as_mut().ok_or(GatewayError::NotConnected)?;

        loop {
            match reader.next().await {
                Some(Ok(WsMessage::Binary(data))) => {
                    if let Some(json) = self.codec.decode_binary(&data)? {
                        return EventParser::parse_message(&json).map(Some);
                    }
                }
                Some(Ok(WsMessage::Text(text))) => {
                    return EventParser::parse_message(&text).map(Some);
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    self.connected = false;
                    let (code, reason) = frame.map_or_else(
                        || (1000, "Normal closure".to_string()),
                        |f| (f.code.into(), f.reason.to_string()),
                    );

                    return Err(GatewayError::ConnectionClosed { code, reason });
                }
                Some(Ok(WsMessage::Ping(data))) => {
                    if let Some(writer) = self.writer.as_mut() {
                        let _ = writer.send(WsMessage::Pong(data)).await;
                    }
                }
                Some(Ok(WsMessage::Pong(_) | WsMessage::Frame(_))) => {}
                Some(Err(e)) => {
                    self.connected = false;
                    return Err(GatewayError::websocket(e.to_string()));
                }
                None => {
                    self.connected = false;
                    return Err(GatewayError::ConnectionClosed {
                        code: 1000,
                        reason: "Stream ended".to_string(),
                    });
                }
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Drives one gateway connection from Hello until it closes.
pub struct GatewayConnectionHandler {
    connection: Box<dyn GatewayConnection>,
    state: GatewayState,
    session: SessionInfo,
    token: String,
    intents: GatewayIntents,
    event_tx: mpsc::UnboundedSender<GatewayEventKind>,
    established: bool,
}

impl GatewayConnectionHandler {
    pub fn new(
        connection: Box<dyn GatewayConnection>,
        token: String,
        intents: GatewayIntents,
        session: SessionInfo,
        event_tx: mpsc::UnboundedSender<GatewayEventKind>,
    ) -> Self {
        Self {
            connection,
            state: GatewayState::new(),
            session,
            token,
            intents,
            event_tx,
            established: false,
        }
    }

    /// Opens the socket, waits for Hello and sends Identify or Resume.
    ///
    /// READY or RESUMED is handled by [`Self::run`].
    pub async fn connect(&mut self) -> GatewayResult<()> {
        self.state.transition_to(ConnectionState::Connecting);

        let resume_url = self
            .session
            .can_resume()
            .then(|| self.session.resume_gateway_url().map(String::from))
            .flatten();
        self.connection.connect(resume_url.as_deref()).await?;

        self.state.transition_to(ConnectionState::WaitingForHello);
        self.await_hello().await?;

        if self.session.can_resume() {
            self.resume().await
        } else {
            self.identify().await
        }
    }

    async fn await_hello(&mut self) -> GatewayResult<()> {
        let message = timeout(HELLO_TIMEOUT, self.connection.receive())
            .await
            .map_err(|_| GatewayError::timeout("Hello"))??
            .ok_or_else(|| GatewayError::protocol("Expected Hello message"))?;

        let opcode = GatewayOpcode::from_u8(message.op);
        if opcode != Some(GatewayOpcode::Hello) {
            return Err(GatewayError::UnexpectedOpcode { opcode });
        }

        let data = message
            .d
            .ok_or_else(|| GatewayError::protocol("Hello missing data"))?;

        let hello = EventParser::parse_hello(&data)?;
        if hello.heartbeat_interval == 0 {
            return Err(GatewayError::protocol("Hello carried a zero heartbeat interval"));
        }
        self.state.set_heartbeat_interval(hello.heartbeat_interval);

        debug!(
            interval_ms = hello.heartbeat_interval,
            "Received Hello from gateway"
        );

        Ok(())
    }

    async fn identify(&mut self) -> GatewayResult<()> {
        self.state.transition_to(ConnectionState::Identifying);

        let payload = GatewayPayload::identify(&self.token, self.intents.as_u32());
        self.connection.send(&payload).await?;

        debug!(intents = self.intents.as_u32(), "Sent Identify payload");
        Ok(())
    }

    async fn resume(&mut self) -> GatewayResult<()> {
        self.state.transition_to(ConnectionState::Resuming);

        let session_id = self
            .session
            .session_id()
            .ok_or_else(|| GatewayError::protocol("No session to resume"))?
            .to_string();

        let sequence = self
            .session
            .sequence()
            .ok_or_else(|| GatewayError::protocol("No sequence to resume"))?;

        let payload = GatewayPayload::resume(&self.token, &session_id, sequence);
        self.connection.send(&payload).await?;

        debug!(session_id = %session_id, sequence = sequence, "Sent Resume payload");
        Ok(())
    }

    /// Pumps messages and heartbeats until an error or until `shutdown` flips.
    ///
    /// # Errors
    /// Returns the error that ended the connection.
    pub async fn run(&mut self, shutdown: &mut watch::Receiver<bool>) -> GatewayResult<()> {
        let interval = self
            .state
            .heartbeat_interval_ms()
            .ok_or_else(|| GatewayError::protocol("Heartbeat interval unknown"))?;

        let mut heartbeat = HeartbeatManager::new(interval);
        let mut ticks = heartbeat.start();

        let result = loop {
            tokio::select! {
                result = self.connection.receive() => {
                    match result {
                        Ok(Some(message)) => {
                            if let Err(e) = self.handle_message(message).await {
                                break Err(e);
                            }
                        }
                        Ok(None) => {}
                        Err(e) => break Err(e),
                    }
                }

                Some(()) = ticks.recv() => {
                    if self.state.is_zombied() {
                        warn!("Heartbeat ACK not received, connection is zombied");
                        break Err(GatewayError::HeartbeatTimeout);
                    }
                    if let Err(e) = self.send_heartbeat().await {
                        break Err(e);
                    }
                }

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Gateway shutting down");
                        break Ok(());
                    }
                }
            }
        };

        heartbeat.stop();
        let _ = self.connection.disconnect().await;
        self.state.transition_to(ConnectionState::Disconnected);

        result
    }

    async fn send_heartbeat(&mut self) -> GatewayResult<()> {
        let payload = GatewayPayload::heartbeat(self.session.sequence());
        self.connection.send(&payload).await?;
        self.state.record_heartbeat_sent();
        trace!(sequence = ?self.session.sequence(), "Sent heartbeat");
        Ok(())
    }

    async fn handle_message(&mut self, message: GatewayMessage) -> GatewayResult<()> {
        self.session.update_sequence(message.s);

        let opcode = GatewayOpcode::from_u8(message.op);
        match opcode {
            Some(GatewayOpcode::Dispatch) => {
                if let Some(event_type) = message.t.as_deref() {
                    trace!(event = event_type, "Raw dispatch received");
                    self.handle_dispatch(event_type, message.d);
                }
            }
            Some(GatewayOpcode::HeartbeatAck) => {
                self.state.record_heartbeat_ack();
                if let Some(latency) = self.state.latency_ms() {
                    let _ = self.event_tx.send(GatewayEventKind::HeartbeatAck {
                        latency_ms: latency,
                    });
                }
            }
            Some(GatewayOpcode::Heartbeat) => {
                debug!("Gateway requested immediate heartbeat");
                self.send_heartbeat().await?;
            }
            Some(GatewayOpcode::Reconnect) => {
                info!("Gateway requested reconnect");
                return Err(GatewayError::ConnectionClosed {
                    code: 4000,
                    reason: "Reconnect requested".to_string(),
                });
            }
            Some(GatewayOpcode::InvalidSession) => {
                let resumable = message.d.and_then(|d| d.as_bool()).unwrap_or(false);

                warn!(resumable = resumable, "Session invalidated");

                if !resumable {
                    self.session.clear();
                }

                return Err(GatewayError::SessionInvalidated { resumable });
            }
            _ => {
                debug!(opcode = ?opcode, "Unhandled opcode");
            }
        }

        Ok(())
    }

    fn handle_dispatch(&mut self, event_type: &str, data: Option<serde_json::Value>) {
        let event = match EventParser::parse_dispatch(event_type, data) {
            Ok(event) => event,
            Err(e) => {
                warn!(event = event_type, error = %e, "Failed to parse dispatch event");
                return;
            }
        };

        match &event {
            DispatchEvent::Ready {
                session_id,
                resume_gateway_url,
                application_id,
                user_id,
                username,
            } => {
                self.session
                    .set_session(session_id.clone(), resume_gateway_url.clone());
                self.session.set_identity(*application_id, *user_id);
                self.state.transition_to(ConnectionState::Connected);
                self.established = true;

                info!(session_id = %session_id, user = %username, "Gateway ready");

                let _ = self.event_tx.send(GatewayEventKind::Connected {
                    session_id: session_id.clone(),
                });
            }
            DispatchEvent::Resumed => {
                self.state.transition_to(ConnectionState::Connected);
                self.established = true;
                info!("Session resumed successfully");
                let _ = self.event_tx.send(GatewayEventKind::Resumed);
                return;
            }
            DispatchEvent::InteractionCreate(_) | DispatchEvent::Unknown { .. } => {}
        }

        debug!(event = event.event_name(), "Dispatching event");
        let _ = self.event_tx.send(GatewayEventKind::Dispatch(event));
    }

    #[must_use]
    pub const fn session(&self) -> &SessionInfo {
        &self.session
    }

    /// Whether READY or RESUMED was received on this connection.
    #[must_use]
    pub const fn established(&self) -> bool {
        self.established
    }

    #[must_use]
    pub fn into_session(self) -> SessionInfo {
        self.session
    }

    #[must_use]
    pub const fn state(&self) -> &GatewayState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::domain::entities::ApplicationId;

    /// Replays scripted messages and records what was sent.
    struct ScriptedConnection {
        incoming: VecDeque<GatewayResult<GatewayMessage>>,
        sent: Arc<Mutex<Vec<GatewayPayload>>>,
        connected_to: Arc<Mutex<Option<String>>>,
    }

    #[async_trait]
    impl GatewayConnection for ScriptedConnection {
        async fn connect(&mut self, gateway_url: Option<&str>) -> GatewayResult<()> {
            *self.connected_to.lock().unwrap() = gateway_url.map(String::from);
            Ok(())
        }

        async fn disconnect(&mut self) -> GatewayResult<()> {
            Ok(())
        }

        async fn send(&mut self, payload: &GatewayPayload) -> GatewayResult<()> {
            let copy = serde_json::from_value(serde_json::to_value(payload).unwrap()).unwrap();
            self.sent.lock().unwrap().push(copy);
            Ok(())
        }

        async fn receive(&mut self) -> GatewayResult<Option<GatewayMessage>> {
            match self.incoming.pop_front() {
                Some(next) => next.map(Some),
                None => std::future::pending().await,
            }
        }

        fn is_connected(&self) -> bool {
            true
        }
    }

    fn message(value: serde_json::Value) -> GatewayResult<GatewayMessage> {
        Ok(serde_json::from_value(value).unwrap())
    }

    fn hello() -> GatewayResult<GatewayMessage> {
        message(json!({"op": 10, "d": {"heartbeat_interval": 45000}}))
    }

    fn ready() -> GatewayResult<GatewayMessage> {
        message(json!({
            "op": 0, "s": 1, "t": "READY",
            "d": {
                "session_id": "sess",
                "resume_gateway_url": "wss://resume.example",
                "user": {"id": "5", "username": "boorubot"},
                "application": {"id": "99"}
            }
        }))
    }

    struct Harness {
        handler: GatewayConnectionHandler,
        sent: Arc<Mutex<Vec<GatewayPayload>>>,
        connected_to: Arc<Mutex<Option<String>>>,
        events: mpsc::UnboundedReceiver<GatewayEventKind>,
    }

    fn harness(script: Vec<GatewayResult<GatewayMessage>>, session: SessionInfo) -> Harness {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let connected_to = Arc::new(Mutex::new(None));
        let (event_tx, events) = mpsc::unbounded_channel();
        let connection = ScriptedConnection {
            incoming: script.into(),
            sent: sent.clone(),
            connected_to: connected_to.clone(),
        };
        let handler = GatewayConnectionHandler::new(
            Box::new(connection),
            "token".into(),
            GatewayIntents::default_bot(),
            session,
            event_tx,
        );

        Harness {
            handler,
            sent,
            connected_to,
            events,
        }
    }

    #[test]
    fn test_websocket_connection_initial_state() {
        let conn = WebSocketConnection::new();
        assert!(!conn.is_connected());
    }

    #[test]
    fn test_resume_url_gets_gateway_query() {
        assert_eq!(
            with_gateway_query("wss://gateway-us-east1-b.discord.gg"),
            "wss://gateway-us-east1-b.discord.gg/?v=10&encoding=json&compress=zlib-stream"
        );
        assert_eq!(with_gateway_query("wss://x/?v=10"), "wss://x/?v=10");
    }

    #[tokio::test]
    async fn test_identify_then_ready() {
        let mut h = harness(vec![hello(), ready()], SessionInfo::new());
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        h.handler.connect().await.unwrap();
        assert_eq!(h.sent.lock().unwrap()[0].op, GatewayOpcode::Identify.as_u8());
        assert!(h.connected_to.lock().unwrap().is_none());

        {
            let run = h.handler.run(&mut shutdown_rx);
            tokio::pin!(run);
            let connected = tokio::select! {
                _ = &mut run => panic!("run ended early"),
                event = h.events.recv() => event,
            };
            assert!(matches!(connected, Some(GatewayEventKind::Connected { .. })));

            shutdown_tx.send(true).unwrap();
            run.await.unwrap();
        }

        let session = h.handler.into_session();
        assert_eq!(session.application_id(), Some(ApplicationId(99)));
        assert_eq!(session.sequence(), Some(1));
        assert!(session.can_resume());
    }

    #[tokio::test]
    async fn test_resume_uses_saved_session() {
        let mut session = SessionInfo::new();
        session.set_session("sess".into(), Some("wss://resume.example".into()));
        session.update_sequence(Some(7));

        let mut h = harness(vec![hello()], session);
        h.handler.connect().await.unwrap();

        let sent = h.sent.lock().unwrap();
        assert_eq!(sent[0].op, GatewayOpcode::Resume.as_u8());
        assert_eq!(sent[0].d["seq"], 7);
        assert_eq!(
            h.connected_to.lock().unwrap().as_deref(),
            Some("wss://resume.example")
        );
    }

    #[tokio::test]
    async fn test_heartbeat_request_is_answered_immediately() {
        let script = vec![
            hello(),
            ready(),
            message(json!({"op": 1, "d": null})),
            message(json!({"op": 9, "d": false})),
        ];
        let mut h = harness(script, SessionInfo::new());
        let (_shutdown_tx, mut shutdown_rx) = watch::channel(false);

        h.handler.connect().await.unwrap();
        let result = h.handler.run(&mut shutdown_rx).await;

        assert!(matches!(
            result,
            Err(GatewayError::SessionInvalidated { resumable: false })
        ));
        let sent = h.sent.lock().unwrap();
        assert!(
            sent.iter()
                .any(|p| p.op == GatewayOpcode::Heartbeat.as_u8() && p.d == json!(1))
        );
        assert!(!h.handler.session().can_resume());
    }

    #[tokio::test]
    async fn test_interaction_is_forwarded() {
        let script = vec![
            hello(),
            ready(),
            message(json!({
                "op": 0, "s": 2, "t": "INTERACTION_CREATE",
                "d": {
                    "id": "1", "application_id": "99", "type": 2, "token": "t",
                    "channel_id": "42", "data": {"name": "image"}
                }
            })),
            message(json!({"op": 7, "d": null})),
        ];
        let mut h = harness(script, SessionInfo::new());
        let (_shutdown_tx, mut shutdown_rx) = watch::channel(false);

        h.handler.connect().await.unwrap();
        let result = h.handler.run(&mut shutdown_rx).await;
        assert!(result.is_err_and(|e| e.can_resume()));

        let mut names = Vec::new();
        while let Ok(event) = h.events.try_recv() {
            if let GatewayEventKind::Dispatch(dispatch) = event {
                names.push(dispatch.event_name());
            }
        }
        assert_eq!(names, vec!["READY", "INTERACTION_CREATE"]);
    }

    #[tokio::test]
    async fn test_unexpected_first_message() {
        let mut h = harness(vec![ready()], SessionInfo::new());
        let result = h.handler.connect().await;
        assert!(matches!(result, Err(GatewayError::UnexpectedOpcode { .. })));
    }

    #[tokio::test]
    async fn test_zero_heartbeat_interval_is_rejected() {
        let script = vec![message(json!({"op": 10, "d": {"heartbeat_interval": 0}}))];
        let mut h = harness(script, SessionInfo::new());

        let result = h.handler.connect().await;

        assert!(matches!(result, Err(GatewayError::ProtocolError { .. })));
        assert!(h.sent.lock().unwrap().is_empty());
    }
}
