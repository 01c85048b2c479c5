//! Image-board response payloads.

use serde::Deserialize;
use serde::de::Error as _;
use serde_json::Value;

use super::providers::ResponseShape;
use crate::domain::entities::Post;

/// One element of a post listing, kept as raw JSON.
///
/// Boards mix in `null` entries and non-string `file_url` values; those
/// become posts without an image instead of failing the whole page.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct PostDto(Value);

impl From<PostDto> for Post {
    fn from(dto: PostDto) -> Self {
        let file_url = dto
            .0
            .get("file_url")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Self::new(file_url)
    }
}

/// Object layout with the listing under `post`.
#[derive(Debug, Deserialize)]
pub struct WrappedPosts {
    /// Absent or `null` when nothing matched.
    #[serde(default)]
    pub post: Option<Vec<PostDto>>,
}

/// Either top-level layout. Arrays are tried first.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PostsBody {
    /// A bare array of posts.
    List(Vec<PostDto>),
    /// An object wrapping the array.
    Wrapped(WrappedPosts),
}

/// Decodes a response body according to the board's layout.
///
/// # Errors
/// Returns the JSON error if the body is not JSON or its layout does not
/// match `shape`.
pub fn decode_posts(shape: ResponseShape, body: &[u8]) -> Result<Vec<Post>, serde_json::Error> {
    let posts = match (shape, serde_json::from_slice::<PostsBody>(body)?) {
        (ResponseShape::List | ResponseShape::ListOrWrapped, PostsBody::List(posts)) => posts,
        (ResponseShape::Wrapped | ResponseShape::ListOrWrapped, PostsBody::Wrapped(wrapped)) => {
            wrapped.post.unwrap_or_default()
        }
        (shape, _) => {
            return Err(serde_json::Error::custom(format!(
                "response layout does not match {shape:?}"
            )));
        }
    };

    Ok(posts.into_iter().map(Post::from).collect())
}
