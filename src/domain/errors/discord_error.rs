//! Discord REST error types.

use thiserror::Error;

/// Discord REST API error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum DiscordError {
    #[error("token rejected by Discord: {message}")]
    Unauthorized { message: String },

    #[error("missing access: {message}")]
    Forbidden { message: String },

    #[error("unknown resource: {message}")]
    NotFound { message: String },

    #[error("rate limited by Discord, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("network error talking to Discord: {message}")]
    Network { message: String },

    #[error("unexpected Discord response: {message}")]
    Unexpected { message: String },
}

impl DiscordError {
    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns whether retrying later could succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::RateLimited { .. })
    }
}
