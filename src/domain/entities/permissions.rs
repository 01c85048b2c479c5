use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Discord permission bits relevant to the bot's commands.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct Permissions: u64 {
        const KICK_MEMBERS = 1 << 1;
        const BAN_MEMBERS = 1 << 2;
        const ADMINISTRATOR = 1 << 3;
        const MANAGE_CHANNELS = 1 << 4;
        const MANAGE_GUILD = 1 << 5;
        const VIEW_CHANNEL = 1 << 10;
        const SEND_MESSAGES = 1 << 11;
        const MANAGE_MESSAGES = 1 << 13;
        const EMBED_LINKS = 1 << 14;
        const READ_MESSAGE_HISTORY = 1 << 16;
        const USE_APPLICATION_COMMANDS = 1 << 31;
    }
}

impl Permissions {
    /// Whether these permissions allow deleting other users' messages.
    #[must_use]
    pub const fn can_manage_messages(self) -> bool {
        self.contains(Self::ADMINISTRATOR) || self.contains(Self::MANAGE_MESSAGES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manage_messages_bit() {
        assert!(Permissions::from_bits_truncate(1 << 13).can_manage_messages());
    }

    #[test]
    fn test_administrator_implies_manage_messages() {
        assert!(Permissions::ADMINISTRATOR.can_manage_messages());
    }

    #[test]
    fn test_regular_member_cannot_manage() {
        let perms = Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES;
        assert!(!perms.can_manage_messages());
    }

    #[test]
    fn test_unknown_bits_are_dropped() {
        let perms = Permissions::from_bits_truncate(u64::MAX);
        assert!(perms.can_manage_messages());
    }
}
