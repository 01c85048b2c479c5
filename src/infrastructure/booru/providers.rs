//! Static request parameters for each supported image board.

use crate::domain::entities::Provider;

/// Top-level JSON layout of a board's post listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// A bare array of posts.
    List,
    /// An object whose `post` field holds the array.
    Wrapped,
    /// Either of the above.
    ListOrWrapped,
}

/// How to query one board.
#[derive(Debug, Clone, Copy)]
pub struct ProviderSpec {
    /// Base URL of the post listing.
    pub endpoint: &'static str,
    /// Query parameters sent with every request.
    pub fixed_params: &'static [(&'static str, &'static str)],
    /// Layout of the JSON body.
    pub shape: ResponseShape,
    /// Whether `random=true` is sent so the board shuffles server-side.
    pub randomizes: bool,
    /// Whether `api_key` and `user_id` are sent.
    pub needs_credentials: bool,
}

const DAPI_PARAMS: &[(&str, &str)] = &[
    ("page", "dapi"),
    ("s", "post"),
    ("q", "index"),
    ("json", "1"),
];

impl ProviderSpec {
    /// Returns the request layout for `provider`.
    #[must_use]
    pub const fn of(provider: Provider) -> Self {
        match provider {
            Provider::Danbooru => Self {
                endpoint: "https://danbooru.donmai.us/posts.json",
                fixed_params: &[],
                shape: ResponseShape::List,
                randomizes: true,
                needs_credentials: false,
            },
            Provider::Safebooru => Self {
                endpoint: "https://safebooru.org/index.php",
                fixed_params: DAPI_PARAMS,
                shape: ResponseShape::Wrapped,
                randomizes: false,
                needs_credentials: false,
            },
            Provider::Rule34 => Self {
                endpoint: "https://api.rule34.xxx/index.php",
                fixed_params: DAPI_PARAMS,
                shape: ResponseShape::ListOrWrapped,
                randomizes: false,
                needs_credentials: true,
            },
        }
    }
}
