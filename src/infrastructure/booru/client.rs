//! Image-board HTTP client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::dto::decode_posts;
use super::providers::ProviderSpec;
use crate::domain::entities::{Post, Provider};
use crate::domain::errors::FetchError;
use crate::domain::ports::ImageBoardPort;

/// User agent sent to every board.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Discord Image Bot)";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// API credentials for Rule34.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Rule34Credentials {
    /// Sent as `api_key`.
    pub api_key: String,
    /// Sent as `user_id`.
    pub user_id: String,
}

impl std::fmt::Debug for Rule34Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule34Credentials")
            .field("api_key", &"***")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Settings shared by every board request.
#[derive(Debug, Clone)]
pub struct BooruSettings {
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Rule34 credentials. Rule34 requests fail without them.
    pub rule34: Option<Rule34Credentials>,
}

impl Default for BooruSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            rule34: None,
        }
    }
}

/// Fetches posts from Danbooru, Safebooru and Rule34.
///
/// Every call opens its own HTTP client, so nothing is pooled between
/// requests and nothing outlives a failed call.
#[derive(Debug, Clone, Default)]
pub struct BooruClient {
    settings: BooruSettings,
    endpoints: HashMap<Provider, String>,
}

impl BooruClient {
    /// Creates client with the given settings.
    #[must_use]
    pub fn new(settings: BooruSettings) -> Self {
        Self {
            settings,
            endpoints: HashMap::new(),
        }
    }

    /// Sends requests for `provider` to `url` instead of its public endpoint.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_endpoint(mut self, provider: Provider, url: impl Into<String>) -> Self {
        self.endpoints.insert(provider, url.into());
        self
    }

    fn endpoint(&self, provider: Provider) -> &str {
        self.endpoints
            .get(&provider)
            .map_or(ProviderSpec::of(provider).endpoint, String::as_str)
    }

    fn query_params(
        &self,
        provider: Provider,
        tag_query: &str,
        limit: u8,
    ) -> Vec<(&'static str, String)> {
        let spec = ProviderSpec::of(provider);
        let mut params: Vec<(&str, String)> = spec
            .fixed_params
            .iter()
            .map(|(key, value)| (*key, (*value).to_string()))
            .collect();
        if spec.randomizes {
            params.push(("random", "true".to_string()));
        }
        params.push(("tags", tag_query.to_string()));
        params.push(("limit", limit.to_string()));

        if spec.needs_credentials
            && let Some(credentials) = &self.settings.rule34
        {
            params.push(("api_key", credentials.api_key.clone()));
            params.push(("user_id", credentials.user_id.clone()));
        }

        params
    }

    fn build_http_client(&self) -> Result<Client, FetchError> {
        Client::builder()
            .user_agent(&self.settings.user_agent)
            .timeout(self.settings.timeout)
            .build()
            .map_err(|e| FetchError::transport(format!("failed to create HTTP client: {e}")))
    }
}

#[async_trait]
impl ImageBoardPort for BooruClient {
    async fn fetch_posts(
        &self,
        provider: Provider,
        tag_query: &str,
        limit: u8,
    ) -> Result<Vec<Post>, FetchError> {
        let spec = ProviderSpec::of(provider);
        if spec.needs_credentials && self.settings.rule34.is_none() {
            debug!(%provider, "No credentials configured, sending anonymous request");
        }

        let client = self.build_http_client()?;
        let response = client
            .get(self.endpoint(provider))
            .query(&self.query_params(provider, tag_query, limit))
            .send()
            .await
            .map_err(|e| {
                warn!(%provider, error = %e, "Image board request failed");
                if e.is_timeout() {
                    FetchError::transport("request timed out")
                } else if e.is_connect() {
                    FetchError::transport(format!("failed to connect to {provider}"))
                } else {
                    FetchError::transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(%provider, %status, "Image board returned non-OK status");
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(format!("failed to read response: {e}")))?;

        let posts = decode_posts(spec.shape, &body).map_err(|e| {
            warn!(%provider, error = %e, "Failed to parse image board response");
            FetchError::decode(e.to_string())
        })?;

        debug!(%provider, posts = posts.len(), "Image board responded");
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn client_for(server: &MockServer, provider: Provider) -> BooruClient {
        BooruClient::default().with_endpoint(provider, server.url("/posts"))
    }

    #[tokio::test]
    async fn test_danbooru_sends_random_and_limit() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/posts")
                    .header("user-agent", DEFAULT_USER_AGENT)
                    .query_param("tags", "cat")
                    .query_param("limit", "3")
                    .query_param("random", "true");
                then.status(200).json_body(json!([
                    {"id": 1, "file_url": "https://d/1.jpg"},
                    {"id": 2, "file_url": "https://d/2.jpg"},
                    {"id": 3, "file_url": "https://d/3.jpg"},
                    {"id": 4, "file_url": "https://d/4.jpg"},
                    {"id": 5, "file_url": "https://d/5.jpg"}
                ]));
            })
            .await;

        let posts = client_for(&server, Provider::Danbooru)
            .fetch_posts(Provider::Danbooru, "cat", 3)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(posts.len(), 5);
    }

    #[tokio::test]
    async fn test_safebooru_empty_wrapped_list() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/posts")
                    .query_param("page", "dapi")
                    .query_param("s", "post")
                    .query_param("q", "index")
                    .query_param("json", "1")
                    .query_param("tags", "nothing_here");
                then.status(200).json_body(json!({"post": []}));
            })
            .await;

        let posts = client_for(&server, Provider::Safebooru)
            .fetch_posts(Provider::Safebooru, "nothing_here", 1)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_non_ok_status_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/posts");
                then.status(503);
            })
            .await;

        let result = client_for(&server, Provider::Danbooru)
            .fetch_posts(Provider::Danbooru, "cat", 1)
            .await;

        assert_eq!(result, Err(FetchError::HttpStatus { status: 503 }));
        assert_eq!(result.unwrap_err().detail(), "503");
    }

    #[tokio::test]
    async fn test_rule34_sends_credentials_and_accepts_object() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/posts")
                    .query_param("tags", "foo -ai_generated")
                    .query_param("api_key", "key")
                    .query_param("user_id", "42");
                then.status(200)
                    .json_body(json!({"post": [{"file_url": "https://r/1.png"}]}));
            })
            .await;

        let client = BooruClient::new(BooruSettings {
            rule34: Some(Rule34Credentials {
                api_key: "key".into(),
                user_id: "42".into(),
            }),
            ..BooruSettings::default()
        })
        .with_endpoint(Provider::Rule34, server.url("/posts"));

        let posts = client
            .fetch_posts(Provider::Rule34, "foo -ai_generated", 1)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            posts[0].clone().into_image_url().as_deref(),
            Some("https://r/1.png")
        );
    }

    #[test]
    fn test_rule34_without_credentials_omits_them() {
        let params = BooruClient::default().query_params(Provider::Rule34, "foo", 2);
        let keys: Vec<&str> = params.iter().map(|(key, _)| *key).collect();

        assert_eq!(keys, vec!["page", "s", "q", "json", "tags", "limit"]);
    }

    #[test]
    fn test_only_randomizing_board_gets_random_param() {
        let client = BooruClient::default();

        let danbooru = client.query_params(Provider::Danbooru, "cat", 3);
        assert_eq!(
            danbooru,
            vec![
                ("random", "true".to_string()),
                ("tags", "cat".to_string()),
                ("limit", "3".to_string()),
            ]
        );

        let safebooru = client.query_params(Provider::Safebooru, "cat", 3);
        assert!(safebooru.iter().all(|(key, _)| *key != "random"));
    }

    #[test]
    fn test_credentials_only_sent_to_rule34() {
        let client = BooruClient::new(BooruSettings {
            rule34: Some(Rule34Credentials {
                api_key: "key".into(),
                user_id: "42".into(),
            }),
            ..BooruSettings::default()
        });

        let params = client.query_params(Provider::Safebooru, "foo", 1);
        assert!(params.iter().all(|(key, _)| *key != "api_key"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/posts");
                then.status(200).body("<html>oops</html>");
            })
            .await;

        let result = client_for(&server, Provider::Safebooru)
            .fetch_posts(Provider::Safebooru, "cat", 1)
            .await;

        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let client =
            BooruClient::default().with_endpoint(Provider::Danbooru, "http://127.0.0.1:1/posts");

        let result = client.fetch_posts(Provider::Danbooru, "cat", 1).await;

        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }
}
