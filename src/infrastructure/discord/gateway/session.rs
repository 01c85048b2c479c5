use crate::domain::entities::{ApplicationId, UserId};

/// Resume data for one gateway session plus the identity learned on READY.
#[derive(Debug, Clone, Default)]
pub struct SessionInfo {
    session_id: Option<String>,
    resume_gateway_url: Option<String>,
    sequence: Option<u64>,
    application_id: Option<ApplicationId>,
    user_id: Option<UserId>,
}

impl SessionInfo {
    /// Empty session. Connecting with it identifies.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session_id: None,
            resume_gateway_url: None,
            sequence: None,
            application_id: None,
            user_id: None,
        }
    }

    /// Stores the `READY` session id and resume URL.
    pub fn set_session(&mut self, session_id: String, resume_url: Option<String>) {
        self.session_id = Some(session_id);
        self.resume_gateway_url = resume_url;
    }

    /// Tracks the latest dispatch sequence. `None` keeps the previous one.
    pub const fn update_sequence(&mut self, sequence: Option<u64>) {
        if let Some(seq) = sequence {
            self.sequence = Some(seq);
        }
    }

    /// Stores the bot's application and user ids.
    pub const fn set_identity(&mut self, application_id: ApplicationId, user_id: UserId) {
        self.application_id = Some(application_id);
        self.user_id = Some(user_id);
    }

    /// Session id from `READY`.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// URL to resume on.
    #[must_use]
    pub fn resume_gateway_url(&self) -> Option<&str> {
        self.resume_gateway_url.as_deref()
    }

    /// Last dispatch sequence.
    #[must_use]
    pub const fn sequence(&self) -> Option<u64> {
        self.sequence
    }

    /// Bot application id.
    #[must_use]
    pub const fn application_id(&self) -> Option<ApplicationId> {
        self.application_id
    }

    /// Bot user id.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Whether a resume has enough data to be attempted.
    #[must_use]
    pub const fn can_resume(&self) -> bool {
        self.session_id.is_some() && self.sequence.is_some()
    }

    /// Forgets resume data; the next connection identifies from scratch.
    pub fn clear(&mut self) {
        self.session_id = None;
        self.resume_gateway_url = None;
        self.sequence = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_info_creation() {
        let session = SessionInfo::new();
        assert!(session.session_id().is_none());
        assert!(!session.can_resume());
    }

    #[test]
    fn test_session_can_resume() {
        let mut session = SessionInfo::new();
        session.set_session("test_session".into(), Some("wss://resume.url".into()));
        session.update_sequence(Some(42));
        session.update_sequence(None);

        assert!(session.can_resume());
        assert_eq!(session.resume_gateway_url(), Some("wss://resume.url"));
        assert_eq!(session.sequence(), Some(42));
    }

    #[test]
    fn test_clear_keeps_identity() {
        let mut session = SessionInfo::new();
        session.set_session("test".into(), None);
        session.update_sequence(Some(1));
        session.set_identity(ApplicationId(9), UserId(5));

        session.clear();
        assert!(!session.can_resume());
        assert_eq!(session.application_id(), Some(ApplicationId(9)));
        assert_eq!(session.user_id(), Some(UserId(5)));
    }
}
