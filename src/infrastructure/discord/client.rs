//! Discord REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, header};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::dto::{
    CALLBACK_CHANNEL_MESSAGE, CALLBACK_DEFERRED_CHANNEL_MESSAGE, ErrorResponse,
    InteractionCallback, MessagePayload, MessageResponse,
};
use crate::domain::entities::{
    ApplicationCommand, ApplicationId, BotToken, ChannelId, InteractionHandle, Message, MessageId,
    Visibility,
};
use crate::domain::errors::DiscordError;
use crate::domain::ports::{DiscordPort, FetchMessagesOptions};

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const USER_AGENT: &str = concat!(
    "DiscordBot (",
    env!("CARGO_PKG_NAME"),
    ", ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Discord REST client authenticated as a bot.
pub struct DiscordClient {
    client: Client,
    base_url: String,
    token: BotToken,
}

impl DiscordClient {
    /// Creates new client with default base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(token: BotToken, timeout: Duration) -> Result<Self, DiscordError> {
        Self::with_base_url(token, timeout, DISCORD_API_BASE)
    }

    /// Creates client with custom base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_base_url(
        token: BotToken,
        timeout: Duration,
        base_url: impl Into<String>,
    ) -> Result<Self, DiscordError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| DiscordError::unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(header::AUTHORIZATION, self.token.authorization())
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, DiscordError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Failed to reach Discord API");
            if e.is_timeout() {
                DiscordError::network("request timed out")
            } else if e.is_connect() {
                DiscordError::network("failed to connect to Discord")
            } else {
                DiscordError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, DiscordError> {
        self.send(request).await?.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse Discord response");
            DiscordError::unexpected(format!("failed to parse response: {e}"))
        })
    }

    async fn handle_error_response(
        status: StatusCode,
        response: reqwest::Response,
    ) -> DiscordError {
        let (message, retry_after) = match response.json::<ErrorResponse>().await {
            Ok(error) => (error.message, error.retry_after),
            Err(_) => (format!("HTTP {status}"), None),
        };

        match status {
            StatusCode::UNAUTHORIZED => DiscordError::Unauthorized { message },
            StatusCode::FORBIDDEN => DiscordError::Forbidden { message },
            StatusCode::NOT_FOUND => DiscordError::NotFound { message },
            StatusCode::TOO_MANY_REQUESTS => DiscordError::RateLimited {
                retry_after_ms: retry_after.map_or(5000, seconds_to_millis),
            },
            StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => {
                DiscordError::network("Discord API is temporarily unavailable")
            }
            _ => DiscordError::unexpected(format!("unexpected response: {status} - {message}")),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn seconds_to_millis(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).ceil() as u64
}

#[async_trait]
impl DiscordPort for DiscordClient {
    async fn register_commands(
        &self,
        application_id: ApplicationId,
        commands: &[ApplicationCommand],
    ) -> Result<(), DiscordError> {
        let url = format!("{}/applications/{application_id}/commands", self.base_url);

        debug!(count = commands.len(), "Registering global commands");

        self.send(self.authorized(self.client.put(&url)).json(commands))
            .await
            .map(|_| ())
    }

    async fn defer_reply(
        &self,
        handle: &InteractionHandle,
        visibility: Visibility,
    ) -> Result<(), DiscordError> {
        let url = format!(
            "{}/interactions/{}/{}/callback",
            self.base_url,
            handle.id,
            handle.token.as_str()
        );
        let body = InteractionCallback {
            kind: CALLBACK_DEFERRED_CHANNEL_MESSAGE,
            data: MessagePayload {
                content: None,
                flags: visibility.flags(),
            },
        };

        self.send(self.client.post(&url).json(&body)).await.map(|_| ())
    }

    async fn reply(
        &self,
        handle: &InteractionHandle,
        content: &str,
        visibility: Visibility,
    ) -> Result<(), DiscordError> {
        let url = format!(
            "{}/interactions/{}/{}/callback",
            self.base_url,
            handle.id,
            handle.token.as_str()
        );
        let body = InteractionCallback {
            kind: CALLBACK_CHANNEL_MESSAGE,
            data: MessagePayload {
                content: Some(content),
                flags: visibility.flags(),
            },
        };

        self.send(self.client.post(&url).json(&body)).await.map(|_| ())
    }

    async fn followup(
        &self,
        handle: &InteractionHandle,
        content: &str,
        visibility: Visibility,
    ) -> Result<(), DiscordError> {
        let url = format!(
            "{}/webhooks/{}/{}",
            self.base_url,
            handle.application_id,
            handle.token.as_str()
        );
        let body = MessagePayload {
            content: Some(content),
            flags: visibility.flags(),
        };

        self.send(self.client.post(&url).json(&body)).await.map(|_| ())
    }

    async fn fetch_messages(
        &self,
        channel_id: ChannelId,
        options: FetchMessagesOptions,
    ) -> Result<Vec<Message>, DiscordError> {
        let url = format!("{}/channels/{channel_id}/messages", self.base_url);

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(limit) = options.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(before) = options.before {
            query.push(("before", before.to_string()));
        }
        if let Some(after) = options.after {
            query.push(("after", after.to_string()));
        }

        let messages: Vec<MessageResponse> = self
            .send_json(self.authorized(self.client.get(&url)).query(&query))
            .await?;

        debug!(%channel_id, count = messages.len(), "Fetched channel messages");

        Ok(messages.into_iter().map(Message::from).collect())
    }

    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<(), DiscordError> {
        let url = format!(
            "{}/channels/{channel_id}/messages/{message_id}",
            self.base_url
        );

        self.send(self.authorized(self.client.delete(&url)))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::domain::entities::{InteractionId, InteractionToken, UserId};

    const TOKEN: &str = "MTIzNDU2Nzg5MDEyMzQ1Njc4.GaBcDe.abcdefghijklmnopqrstuvwxyz0123456789";

    fn client(server: &MockServer) -> DiscordClient {
        DiscordClient::with_base_url(
            BotToken::new_unchecked(TOKEN),
            Duration::from_secs(5),
            server.base_url(),
        )
        .unwrap()
    }

    fn handle() -> InteractionHandle {
        InteractionHandle {
            id: InteractionId(11),
            application_id: ApplicationId(22),
            token: InteractionToken::new("itoken"),
        }
    }

    #[tokio::test]
    async fn test_defer_ephemeral() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/interactions/11/itoken/callback")
                    .json_body(json!({"type": 5, "data": {"flags": 64}}));
                then.status(204);
            })
            .await;

        client(&server)
            .defer_reply(&handle(), Visibility::Ephemeral)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_followup_goes_to_webhook() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/webhooks/22/itoken")
                    .json_body(json!({"content": "https://a/1.png"}));
                then.status(200).json_body(json!({"id": "1"}));
            })
            .await;

        client(&server)
            .followup(&handle(), "https://a/1.png", Visibility::Public)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_messages_sends_bot_auth_and_after() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/channels/42/messages")
                    .header("authorization", format!("Bot {TOKEN}"))
                    .query_param("after", "99")
                    .query_param("limit", "100");
                then.status(200).json_body(json!([
                    {
                        "id": "150",
                        "channel_id": "42",
                        "author": {"id": "7"},
                        "timestamp": "2024-05-01T10:00:00+00:00"
                    }
                ]));
            })
            .await;

        let options = FetchMessagesOptions::default()
            .with_limit(100)
            .after_message(MessageId(99));
        let messages = client(&server)
            .fetch_messages(ChannelId(42), options)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].author_id(), UserId(7));
    }

    #[tokio::test]
    async fn test_register_commands_puts_list() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/applications/22/commands")
                    .json_body(json!([
                        {"name": "ping", "description": "Ping", "type": 1}
                    ]));
                then.status(200).json_body(json!([]));
            })
            .await;

        client(&server)
            .register_commands(
                ApplicationId(22),
                &[ApplicationCommand::chat_input("ping", "Ping")],
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_statuses_are_mapped() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/channels/42/messages/1");
                then.status(403)
                    .json_body(json!({"message": "Missing Permissions", "code": 50013}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/channels/42/messages/2");
                then.status(429).json_body(json!({
                    "message": "You are being rate limited.",
                    "retry_after": 1.5
                }));
            })
            .await;

        let forbidden = client(&server)
            .delete_message(ChannelId(42), MessageId(1))
            .await;
        let limited = client(&server)
            .delete_message(ChannelId(42), MessageId(2))
            .await;

        assert!(matches!(
            forbidden,
            Err(DiscordError::Forbidden { message }) if message == "Missing Permissions"
        ));
        assert!(matches!(
            limited,
            Err(DiscordError::RateLimited {
                retry_after_ms: 1500
            })
        ));
    }
}
