//! Image-board port definition.

use async_trait::async_trait;

use crate::domain::entities::{Post, Provider};
use crate::domain::errors::FetchError;

/// Port for querying an image board for posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageBoardPort: Send + Sync {
    /// Issues one search request and returns the decoded posts.
    ///
    /// `limit` is forwarded as the provider's page size.
    async fn fetch_posts(
        &self,
        provider: Provider,
        tag_query: &str,
        limit: u8,
    ) -> Result<Vec<Post>, FetchError>;
}
