//! Image-board provider identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Image boards the bot can search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// danbooru.donmai.us
    #[default]
    Danbooru,
    /// safebooru.org
    Safebooru,
    /// api.rule34.xxx
    Rule34,
}

impl Provider {
    /// All providers, in the order they are offered to users.
    pub const ALL: [Self; 3] = [Self::Danbooru, Self::Safebooru, Self::Rule34];

    /// Returns the lowercase name used in commands and config files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Danbooru => "danbooru",
            Self::Safebooru => "safebooru",
            Self::Rule34 => "rule34",
        }
    }

    /// Tag appended to every query sent to this provider.
    #[must_use]
    pub const fn query_suffix(self) -> Option<&'static str> {
        match self {
            Self::Rule34 => Some("-ai_generated"),
            Self::Danbooru | Self::Safebooru => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a provider name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown image board: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownProvider(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("danbooru", Provider::Danbooru ; "danbooru")]
    #[test_case("Safebooru", Provider::Safebooru ; "mixed_case")]
    #[test_case(" rule34 ", Provider::Rule34 ; "padded")]
    fn test_parse_provider(input: &str, expected: Provider) {
        assert_eq!(input.parse::<Provider>(), Ok(expected));
    }

    #[test]
    fn test_parse_unknown_provider() {
        assert_eq!(
            "gelbooru".parse::<Provider>(),
            Err(UnknownProvider("gelbooru".to_string()))
        );
    }

    #[test]
    fn test_only_rule34_has_suffix() {
        assert_eq!(Provider::Rule34.query_suffix(), Some("-ai_generated"));
        assert!(Provider::Danbooru.query_suffix().is_none());
        assert!(Provider::Safebooru.query_suffix().is_none());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Provider::Safebooru).unwrap();
        assert_eq!(json, "\"safebooru\"");
    }
}
