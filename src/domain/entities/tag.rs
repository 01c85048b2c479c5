//! Tag normalization and query composition.

use std::fmt;

use super::Provider;

/// Canonicalizes free-text tag input.
///
/// Absent or empty input yields an empty string. Otherwise surrounding
/// whitespace is stripped and interior spaces become underscores, so
/// `"yuzu (blue archive)"` becomes `"yuzu_(blue_archive)"`.
#[must_use]
pub fn normalize_tag(tag: Option<&str>) -> String {
    match tag {
        Some(tag) if !tag.is_empty() => tag.trim().replace(' ', "_"),
        _ => String::new(),
    }
}

/// Space-separated tag string sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagQuery(String);

impl TagQuery {
    /// Builds the query for `provider` from raw user input.
    ///
    /// The second tag is only included when it normalizes to something
    /// non-empty. Provider suffixes are always appended.
    #[must_use]
    pub fn compose(primary: &str, secondary: Option<&str>, provider: Provider) -> Self {
        let mut query = normalize_tag(Some(primary));

        let secondary = normalize_tag(secondary);
        if !secondary.is_empty() {
            query.push(' ');
            query.push_str(&secondary);
        }

        if let Some(suffix) = provider.query_suffix() {
            query.push(' ');
            query.push_str(suffix);
        }

        Self(query)
    }

    /// Returns the query as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
