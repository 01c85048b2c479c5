//! Image-board request error types.

use thiserror::Error;

/// Classified failure of a single image-board request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum FetchError {
    /// Board answered with a non-success HTTP status.
    #[error("{status}")]
    HttpStatus { status: u16 },

    /// Request never produced a response.
    #[error("request failed: {message}")]
    Transport { message: String },

    /// Response body was not a post list.
    #[error("invalid response body: {message}")]
    Decode { message: String },
}

impl FetchError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Text shown to users next to the searched tags.
    ///
    /// A status failure is reported as the bare code, e.g. `"503"`.
    #[must_use]
    pub fn detail(&self) -> String {
        self.to_string()
    }

    /// Returns the HTTP status for status failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        if let Self::HttpStatus { status } = self {
            Some(*status)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_detail_is_bare_code() {
        let error = FetchError::HttpStatus { status: 503 };
        assert_eq!(error.detail(), "503");
        assert_eq!(error.status(), Some(503));
    }

    #[test]
    fn test_transport_detail_keeps_message() {
        let error = FetchError::transport("dns error");
        assert!(error.detail().contains("dns error"));
        assert_eq!(error.status(), None);
    }
}
