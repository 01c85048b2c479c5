//! Image search use case.

use tracing::{debug, info};

use crate::application::dto::{SearchReply, SearchRequest};
use crate::application::services::ImageFetchService;
use crate::domain::entities::TagQuery;

/// Largest number of images one search may return.
pub const MAX_IMAGE_COUNT: u8 = 10;

/// Runs the `/image search` command.
#[derive(Clone)]
pub struct SearchImagesUseCase {
    fetcher: ImageFetchService,
}

impl SearchImagesUseCase {
    /// Creates new search use case.
    #[must_use]
    pub const fn new(fetcher: ImageFetchService) -> Self {
        Self { fetcher }
    }

    /// Validates the request, queries the board and builds the reply.
    ///
    /// An out-of-range count is answered without contacting the board.
    pub async fn execute(&self, request: SearchRequest) -> SearchReply {
        let query = TagQuery::compose(
            &request.primary_tag,
            request.secondary_tag.as_deref(),
            request.provider,
        );

        let Some(count) = u8::try_from(request.count)
            .ok()
            .filter(|c| (1..=MAX_IMAGE_COUNT).contains(c))
        else {
            debug!(count = request.count, "Rejected image count");
            return SearchReply::InvalidCount;
        };

        let outcome = self
            .fetcher
            .fetch_images(request.provider, query.as_str(), count)
            .await;

        if let Some(detail) = outcome.error_detail {
            return SearchReply::Failed {
                query: query.to_string(),
                detail,
            };
        }

        if outcome.urls.is_empty() {
            info!(provider = %request.provider, %query, "No images matched");
            return SearchReply::NoMatch {
                query: query.to_string(),
            };
        }

        info!(
            provider = %request.provider,
            %query,
            returned = outcome.urls.len(),
            "Image search succeeded"
        );

        SearchReply::Found { urls: outcome.urls }
    }
}
