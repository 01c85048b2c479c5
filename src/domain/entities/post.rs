//! Image-board post entity.

/// A single post returned by an image board.
///
/// Only the image URL is kept; every other field a provider sends is dropped
/// during decoding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Post {
    file_url: Option<String>,
}

impl Post {
    /// Creates a post with the given image URL.
    #[must_use]
    pub fn new(file_url: Option<String>) -> Self {
        Self { file_url }
    }

    /// Consumes the post and returns its usable image URL.
    #[must_use]
    pub fn into_image_url(self) -> Option<String> {
        self.file_url.filter(|url| !url.is_empty())
    }
}
