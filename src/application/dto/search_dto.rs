//! Image search DTOs.

use std::fmt;

use crate::domain::entities::Provider;

/// Image search request as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// First (required) tag, raw user input.
    pub primary_tag: String,
    /// Optional second tag, raw user input.
    pub secondary_tag: Option<String>,
    /// Board to search.
    pub provider: Provider,
    /// Requested number of images. Validated by the use case.
    pub count: i64,
}

impl SearchRequest {
    /// Creates a request for one image from the default board.
    #[must_use]
    pub fn new(primary_tag: impl Into<String>) -> Self {
        Self {
            primary_tag: primary_tag.into(),
            secondary_tag: None,
            provider: Provider::default(),
            count: 1,
        }
    }

    /// Adds the optional second tag.
    #[must_use]
    pub fn with_secondary(mut self, tag: impl Into<String>) -> Self {
        self.secondary_tag = Some(tag.into());
        self
    }

    /// Selects the board to search.
    #[must_use]
    pub const fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Sets the requested image count.
    #[must_use]
    pub const fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }
}

/// Result of one image fetch.
///
/// `urls` empty with `error_detail` set means the request failed; `urls`
/// empty without detail means the board had no matching posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Distinct image URLs, at most the requested count.
    pub urls: Vec<String>,
    /// Status code or message when the request failed.
    pub error_detail: Option<String>,
}

impl FetchOutcome {
    /// Outcome carrying selected URLs.
    #[must_use]
    pub const fn found(urls: Vec<String>) -> Self {
        Self {
            urls,
            error_detail: None,
        }
    }

    /// The board answered without usable posts.
    #[must_use]
    pub const fn no_match() -> Self {
        Self {
            urls: Vec::new(),
            error_detail: None,
        }
    }

    /// The request failed with `detail`.
    #[must_use]
    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            urls: Vec::new(),
            error_detail: Some(detail.into()),
        }
    }
}

/// Reply produced for an image search.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum SearchReply {
    /// Requested count was outside the allowed range.
    InvalidCount,
    /// The board request failed.
    Failed { query: String, detail: String },
    /// The board answered but nothing usable matched.
    NoMatch { query: String },
    /// Image URLs to post.
    Found { urls: Vec<String> },
}

impl fmt::Display for SearchReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCount => f.write_str("Count: should be under 10."),
            Self::Failed { query, detail } => write!(
                f,
                "Image not found.\nsearched tags: {query}\nHTTP Error: {detail}"
            ),
            Self::NoMatch { query } => write!(f, "Image not found.\nsearched tags: {query}"),
            Self::Found { urls } => f.write_str(&urls.join("\n")),
        }
    }
}
