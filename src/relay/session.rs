use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Connection state of the voice call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No call
    #[default]
    Idle,
    /// Start requested, waiting for the call to connect
    Connecting,
    /// Call connected, editor activity is relayed
    Active,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Disconnected"),
            SessionState::Connecting => write!(f, "Connecting"),
            SessionState::Active => write!(f, "Connected"),
        }
    }
}

/// One voice-assistant call, from start request to call end
#[derive(Clone, Debug)]
pub struct Session {
    pub id: Uuid,
    pub state: SessionState,
    /// When the user asked to start
    pub requested_at: DateTime<Utc>,
    /// When the call connected
    pub started_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Connecting,
            requested_at: Utc::now(),
            started_at: None,
        }
    }

    pub fn activate(&mut self) {
        self.state = SessionState::Active;
        self.started_at = Some(Utc::now());
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let mut session = Session::new();
        assert_eq!(session.state, SessionState::Connecting);
        assert!(session.started_at.is_none());

        session.activate();
        assert!(session.state.is_active());
        assert!(session.started_at.unwrap() >= session.requested_at);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Idle.to_string(), "Disconnected");
        assert_eq!(SessionState::Active.to_string(), "Connected");
    }
}
