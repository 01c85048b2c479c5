//! Image fetching with response filtering and sampling.

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, warn};

use crate::application::dto::FetchOutcome;
use crate::domain::entities::{Post, Provider};
use crate::domain::ports::ImageBoardPort;
use crate::domain::services::sample;

/// Queries an image board and trims the result to the requested size.
///
/// Never fails: every request error is folded into the returned
/// [`FetchOutcome`].
#[derive(Clone)]
pub struct ImageFetchService {
    image_board: Arc<dyn ImageBoardPort>,
}

impl ImageFetchService {
    /// Creates a service over the given board adapter.
    #[must_use]
    pub const fn new(image_board: Arc<dyn ImageBoardPort>) -> Self {
        Self { image_board }
    }

    /// Fetches up to `count` random image URLs for `tag_query`.
    ///
    /// The caller is responsible for bounding `count`.
    pub async fn fetch_images(
        &self,
        provider: Provider,
        tag_query: &str,
        count: u8,
    ) -> FetchOutcome {
        debug!(%provider, tag_query, count, "Fetching images");

        match self.image_board.fetch_posts(provider, tag_query, count).await {
            Ok(posts) => {
                let outcome = select_urls(posts, usize::from(count), &mut rand::thread_rng());
                debug!(%provider, found = outcome.urls.len(), "Image fetch finished");
                outcome
            }
            Err(e) => {
                warn!(
                    %provider,
                    tag_query,
                    status = ?e.status(),
                    error = %e,
                    "Image fetch failed"
                );
                FetchOutcome::failed(e.detail())
            }
        }
    }
}

/// Keeps posts with a usable, not yet seen image URL and samples `count` of them.
pub fn select_urls<R>(posts: Vec<Post>, count: usize, rng: &mut R) -> FetchOutcome
where
    R: Rng + ?Sized,
{
    let mut seen = HashSet::new();
    let urls: Vec<String> = posts
        .into_iter()
        .filter_map(Post::into_image_url)
        .filter(|url| seen.insert(url.clone()))
        .collect();

    if urls.is_empty() {
        return FetchOutcome::no_match();
    }

    FetchOutcome::found(sample(&urls, count, rng))
}

#[cfg(test)]
mod tests {
    use mockall::predicate::{always, eq};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::domain::errors::FetchError;
    use crate::domain::ports::mocks::MockImageBoardPort;

    fn posts(n: usize) -> Vec<Post> {
        (0..n)
            .map(|i| Post::new(Some(format!("https://img.example/{i}.png"))))
            .collect()
    }

    #[test]
    fn test_select_samples_when_more_than_requested() {
        let mut rng = StdRng::seed_from_u64(3);
        for count in 1..=10 {
            let outcome = select_urls(posts(15), count, &mut rng);
            let unique: HashSet<_> = outcome.urls.iter().collect();
            assert_eq!(outcome.urls.len(), count);
            assert_eq!(unique.len(), count);
            assert!(outcome.error_detail.is_none());
        }
    }

    #[test]
    fn test_select_returns_all_in_order_when_fewer() {
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = select_urls(posts(3), 10, &mut rng);
        let expected: Vec<String> = posts(3)
            .into_iter()
            .filter_map(Post::into_image_url)
            .collect();
        assert_eq!(outcome.urls, expected);
    }

    #[test]
    fn test_select_filters_posts_without_url() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut input = posts(2);
        input.push(Post::new(None));
        input.push(Post::new(Some(String::new())));

        let outcome = select_urls(input, 5, &mut rng);
        assert_eq!(outcome.urls.len(), 2);
    }

    #[test]
    fn test_select_no_valid_posts_is_no_match() {
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = select_urls(vec![Post::new(None)], 3, &mut rng);
        assert_eq!(outcome, FetchOutcome::no_match());
    }

    #[test]
    fn test_select_drops_duplicate_urls() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut input = posts(2);
        input.extend(posts(2));

        let outcome = select_urls(input, 4, &mut rng);
        assert_eq!(outcome.urls.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_images_forwards_count_as_limit() {
        let mut port = MockImageBoardPort::new();
        port.expect_fetch_posts()
            .with(eq(Provider::Danbooru), eq("cat"), eq(3))
            .times(1)
            .returning(|_, _, _| Ok(posts(5)));

        let service = ImageFetchService::new(Arc::new(port));
        let outcome = service.fetch_images(Provider::Danbooru, "cat", 3).await;

        assert_eq!(outcome.urls.len(), 3);
        assert!(outcome.error_detail.is_none());
    }

    #[tokio::test]
    async fn test_fetch_images_status_error_becomes_detail() {
        let mut port = MockImageBoardPort::new();
        port.expect_fetch_posts()
            .with(always(), always(), always())
            .returning(|_, _, _| Err(FetchError::HttpStatus { status: 503 }));

        let service = ImageFetchService::new(Arc::new(port));
        let outcome = service.fetch_images(Provider::Safebooru, "cat", 1).await;

        assert_eq!(outcome, FetchOutcome::failed("503"));
    }

    #[tokio::test]
    async fn test_fetch_images_transport_error_becomes_detail() {
        let mut port = MockImageBoardPort::new();
        port.expect_fetch_posts()
            .returning(|_, _, _| Err(FetchError::transport("connection reset")));

        let service = ImageFetchService::new(Arc::new(port));
        let outcome = service.fetch_images(Provider::Rule34, "cat", 1).await;

        assert!(outcome.urls.is_empty());
        assert!(outcome.error_detail.unwrap().contains("connection reset"));
    }
}
