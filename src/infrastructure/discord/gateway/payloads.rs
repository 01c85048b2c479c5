use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::constants::{CLIENT_PROPERTIES_BROWSER, CLIENT_PROPERTIES_DEVICE, GatewayOpcode};
use crate::domain::entities::{
    ApplicationId, ChannelId, CommandData, CommandOption, GuildId, InteractionId, OptionValue,
    UserId,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    pub d: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayPayload {
    fn new(opcode: GatewayOpcode, d: Value) -> Self {
        Self {
            op: opcode.as_u8(),
            d,
            s: None,
            t: None,
        }
    }

    #[must_use]
    pub fn heartbeat(sequence: Option<u64>) -> Self {
        Self::new(
            GatewayOpcode::Heartbeat,
            sequence.map_or(Value::Null, |s| Value::Number(s.into())),
        )
    }

    #[must_use]
    pub fn identify(token: &str, intents: u32) -> Self {
        let identify = IdentifyData {
            token,
            properties: IdentifyProperties {
                os: std::env::consts::OS,
                browser: CLIENT_PROPERTIES_BROWSER,
                device: CLIENT_PROPERTIES_DEVICE,
            },
            intents,
        };

        Self::new(
            GatewayOpcode::Identify,
            serde_json::to_value(identify).unwrap_or(Value::Null),
        )
    }

    #[must_use]
    pub fn resume(token: &str, session_id: &str, sequence: u64) -> Self {
        let resume = ResumeData {
            token,
            session_id,
            seq: sequence,
        };

        Self::new(
            GatewayOpcode::Resume,
            serde_json::to_value(resume).unwrap_or(Value::Null),
        )
    }
}

#[derive(Debug, Serialize)]
struct IdentifyData<'a> {
    token: &'a str,
    properties: IdentifyProperties,
    intents: u32,
}

#[derive(Debug, Serialize)]
struct IdentifyProperties {
    os: &'static str,
    browser: &'static str,
    device: &'static str,
}

#[derive(Debug, Serialize)]
struct ResumeData<'a> {
    token: &'a str,
    session_id: &'a str,
    seq: u64,
}

#[derive(Debug, Deserialize)]
pub struct GatewayMessage {
    pub op: u8,
    pub d: Option<Value>,
    pub s: Option<u64>,
    pub t: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HelloPayload {
    pub heartbeat_interval: u64,
}

#[derive(Debug, Deserialize)]
pub struct ReadyPayload {
    pub session_id: String,
    pub resume_gateway_url: Option<String>,
    pub user: UserPayload,
    pub application: ReadyApplication,
}

#[derive(Debug, Deserialize)]
pub struct ReadyApplication {
    pub id: ApplicationId,
}

#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct MemberPayload {
    pub user: Option<UserPayload>,
    #[serde(default, deserialize_with = "crate::domain::serde_utils::bitset_string::deserialize")]
    pub permissions: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct InteractionPayload {
    pub id: InteractionId,
    pub application_id: ApplicationId,
    #[serde(rename = "type")]
    pub kind: u8,
    pub token: String,
    pub channel_id: Option<ChannelId>,
    pub guild_id: Option<GuildId>,
    pub member: Option<MemberPayload>,
    pub user: Option<UserPayload>,
    pub data: Option<CommandDataPayload>,
}

#[derive(Debug, Deserialize)]
pub struct CommandDataPayload {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOptionPayload>,
}

impl From<CommandDataPayload> for CommandData {
    fn from(payload: CommandDataPayload) -> Self {
        Self {
            name: payload.name,
            options: payload.options.into_iter().map(Into::into).collect(),
        }
    }
}

/// Application command option types that carry a value.
const OPTION_TYPE_INTEGER: u8 = 4;
const OPTION_TYPE_BOOLEAN: u8 = 5;
const OPTION_TYPE_NUMBER: u8 = 10;

#[derive(Debug, Deserialize)]
pub struct CommandOptionPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub value: Option<Value>,
    #[serde(default)]
    pub options: Vec<Self>,
}

impl CommandOptionPayload {
    fn option_value(kind: u8, value: Value) -> Option<OptionValue> {
        match (kind, value) {
            (OPTION_TYPE_INTEGER, Value::Number(n)) => n.as_i64().map(OptionValue::Integer),
            (OPTION_TYPE_NUMBER, Value::Number(n)) => n.as_f64().map(OptionValue::Number),
            (OPTION_TYPE_BOOLEAN, Value::Bool(b)) => Some(OptionValue::Boolean(b)),
            (_, Value::String(s)) => Some(OptionValue::String(s)),
            (_, Value::Number(n)) => Some(OptionValue::String(n.to_string())),
            _ => None,
        }
    }
}

impl From<CommandOptionPayload> for CommandOption {
    fn from(payload: CommandOptionPayload) -> Self {
        Self {
            name: payload.name,
            value: payload
                .value
                .and_then(|v| CommandOptionPayload::option_value(payload.kind, v)),
            options: payload.options.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_heartbeat_payload() {
        let payload = GatewayPayload::heartbeat(Some(42));
        assert_eq!(payload.op, 1);
        assert_eq!(payload.d, Value::Number(42.into()));
    }

    #[test]
    fn test_heartbeat_null_sequence() {
        let payload = GatewayPayload::heartbeat(None);
        assert_eq!(payload.d, Value::Null);
    }

    #[test]
    fn test_identify_payload_structure() {
        let payload = GatewayPayload::identify("bot_token", 1);
        assert_eq!(payload.op, 2);
        assert_eq!(payload.d["token"], "bot_token");
        assert_eq!(payload.d["intents"], 1);
        assert_eq!(payload.d["properties"]["browser"], CLIENT_PROPERTIES_BROWSER);
    }

    #[test]
    fn test_resume_payload() {
        let payload = GatewayPayload::resume("token", "session123", 100);
        assert_eq!(payload.op, 6);
        assert_eq!(payload.d["session_id"], "session123");
        assert_eq!(payload.d["seq"], 100);
    }

    #[test]
    fn test_option_values_follow_declared_type() {
        let options: Vec<CommandOptionPayload> = serde_json::from_value(json!([
            {"name": "count", "type": 4, "value": 3},
            {"name": "tag1", "type": 3, "value": "cat"},
            {"name": "ratio", "type": 10, "value": 0.5},
            {"name": "nsfw", "type": 5, "value": false},
            {"name": "search", "type": 1, "options": []}
        ]))
        .unwrap();

        let options: Vec<CommandOption> = options.into_iter().map(Into::into).collect();
        assert_eq!(options[0].value, Some(OptionValue::Integer(3)));
        assert_eq!(options[1].value, Some(OptionValue::String("cat".into())));
        assert_eq!(options[2].value, Some(OptionValue::Number(0.5)));
        assert_eq!(options[3].value, Some(OptionValue::Boolean(false)));
        assert_eq!(options[4].value, None);
    }
}
