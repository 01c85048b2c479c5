use flate2::{Decompress, FlushDecompress};

use super::constants::ZLIB_SUFFIX;
use super::error::{GatewayError, GatewayResult};
use super::events::DispatchEvent;
use super::payloads::{GatewayMessage, HelloPayload, InteractionPayload, ReadyPayload};
use crate::domain::entities::{
    Interaction, InteractionHandle, InteractionKind, InteractionToken, Permissions,
};

const INITIAL_BUFFER_SIZE: usize = 32 * 1024;
const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Inflates a `zlib-stream` gateway connection.
///
/// The whole connection shares one zlib context; a message is complete
/// once the buffered frames end with the sync-flush suffix.
pub struct GatewayCodec {
    inflater: Decompress,
    compressed_buffer: Vec<u8>,
}

impl GatewayCodec {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inflater: Decompress::new(true),
            compressed_buffer: Vec::with_capacity(4096),
        }
    }

    pub fn decode_binary(&mut self, data: &[u8]) -> GatewayResult<Option<String>> {
        self.compressed_buffer.extend_from_slice(data);

        if !self.compressed_buffer.ends_with(&ZLIB_SUFFIX) {
            return Ok(None);
        }

        let mut pending = std::mem::take(&mut self.compressed_buffer);
        let result = self.inflate(&pending);
        pending.clear();
        self.compressed_buffer = pending;

        result.map(Some)
    }

    fn inflate(&mut self, mut input: &[u8]) -> GatewayResult<String> {
        let mut output = Vec::with_capacity(INITIAL_BUFFER_SIZE);

        loop {
            if output.len() == output.capacity() {
                if output.capacity() >= MAX_BUFFER_SIZE {
                    return Err(GatewayError::compression(
                        "decompressed data exceeds maximum size",
                    ));
                }
                output.reserve(output.capacity());
            }

            let in_before = self.inflater.total_in();
            self.inflater
                .decompress_vec(input, &mut output, FlushDecompress::Sync)
                .map_err(|e| GatewayError::compression(e.to_string()))?;

            let consumed = usize::try_from(self.inflater.total_in() - in_before).unwrap_or(0);
            input = &input[consumed.min(input.len())..];

            if input.is_empty() && output.len() < output.capacity() {
                break;
            }
        }

        String::from_utf8(output)
            .map_err(|e| GatewayError::compression(format!("invalid UTF-8: {e}")))
    }

    pub fn reset(&mut self) {
        self.inflater.reset(true);
        self.compressed_buffer.clear();
    }
}

impl Default for GatewayCodec {
    fn default() -> Self {
        Self::new()
    }
}

pub struct EventParser;

impl EventParser {
    pub fn parse_message(json: &str) -> GatewayResult<GatewayMessage> {
        serde_json::from_str(json).map_err(|e| GatewayError::serialization(e.to_string()))
    }

    pub fn parse_hello(data: &serde_json::Value) -> GatewayResult<HelloPayload> {
        serde_json::from_value(data.clone())
            .map_err(|e| GatewayError::serialization(format!("Failed to parse Hello: {e}")))
    }

    pub fn parse_dispatch(
        event_type: &str,
        data: Option<serde_json::Value>,
    ) -> GatewayResult<DispatchEvent> {
        match event_type {
            "READY" => {
                let data = data.ok_or_else(|| GatewayError::protocol("Missing dispatch data"))?;
                Self::parse_ready(data)
            }
            "RESUMED" => Ok(DispatchEvent::Resumed),
            "INTERACTION_CREATE" => {
                let data = data.ok_or_else(|| GatewayError::protocol("Missing dispatch data"))?;
                Self::parse_interaction(data)
            }
            _ => Ok(DispatchEvent::Unknown {
                event_type: event_type.to_string(),
            }),
        }
    }

    fn parse_ready(data: serde_json::Value) -> GatewayResult<DispatchEvent> {
        let ready: ReadyPayload = serde_json::from_value(data)
            .map_err(|e| GatewayError::serialization(format!("Failed to parse Ready: {e}")))?;

        Ok(DispatchEvent::Ready {
            session_id: ready.session_id,
            resume_gateway_url: ready.resume_gateway_url,
            application_id: ready.application.id,
            user_id: ready.user.id,
            username: ready.user.username,
        })
    }

    fn parse_interaction(data: serde_json::Value) -> GatewayResult<DispatchEvent> {
        let payload: InteractionPayload = serde_json::from_value(data).map_err(|e| {
            GatewayError::serialization(format!("Failed to parse InteractionCreate: {e}"))
        })?;

        let (member_user, member_permissions) = payload
            .member
            .map_or((None, None), |m| (m.user, m.permissions));

        let user_id = member_user.or(payload.user).map(|u| u.id);

        let interaction = Interaction {
            handle: InteractionHandle {
                id: payload.id,
                application_id: payload.application_id,
                token: InteractionToken::new(payload.token),
            },
            kind: InteractionKind::from(payload.kind),
            channel_id: payload.channel_id,
            guild_id: payload.guild_id,
            user_id,
            member_permissions: member_permissions.map(Permissions::from_bits_truncate),
            data: payload.data.map(Into::into),
        };

        Ok(DispatchEvent::InteractionCreate(Box::new(interaction)))
    }
}
