//! Discord snowflake identifiers.

use serde::{Deserialize, Serialize};

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(#[serde(with = "crate::domain::serde_utils::snowflake")] pub u64);

        impl $name {
            /// Returns the underlying u64 value.
            #[must_use]
            pub const fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                value.trim().parse().map(Self)
            }
        }
    };
}

snowflake_id!(
    /// Unique identifier for a Discord application (the bot's app).
    ApplicationId
);
snowflake_id!(
    /// Unique identifier for a Discord channel.
    ChannelId
);
snowflake_id!(
    /// Unique identifier for a Discord guild.
    GuildId
);
snowflake_id!(
    /// Unique identifier for an interaction.
    InteractionId
);
snowflake_id!(
    /// Unique identifier for a Discord message.
    MessageId
);
snowflake_id!(
    /// Unique identifier for a Discord user.
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_from_str_trims() {
        let id: MessageId = " 1234567890 ".parse().unwrap();
        assert_eq!(id, MessageId(1_234_567_890));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert!("abc".parse::<ChannelId>().is_err());
    }

    #[test]
    fn test_deserialize_from_string_and_number() {
        let from_str: UserId = serde_json::from_str("\"42\"").unwrap();
        let from_num: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(from_str, from_num);
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&GuildId(7)).unwrap();
        assert_eq!(json, "\"7\"");
    }
}
