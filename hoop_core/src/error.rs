use std::fmt;

/// Misuse of the ball lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// A ball is already waiting for a shot
    PendingBallExists,
    /// There is no ball to launch
    NoPendingBall,
    /// The entity lost its rigid body
    MissingBody,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::PendingBallExists => write!(f, "a pending ball already exists"),
            GameError::NoPendingBall => write!(f, "no pending ball to launch"),
            GameError::MissingBody => write!(f, "ball has no rigid body"),
        }
    }
}

impl std::error::Error for GameError {}

/// Rejected session requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    MissingName,
    MissingSide,
    /// The action is not valid in the current state
    InvalidTransition(&'static str),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::MissingName => write!(f, "enter a name before starting"),
            SessionError::MissingSide => write!(f, "pick a team before starting"),
            SessionError::InvalidTransition(what) => write!(f, "cannot {what} right now"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Failures reported by a leaderboard backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached
    Unavailable(String),
    /// The backend rejected the request
    Rejected(String),
    /// The backend answered with something unreadable
    Malformed(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(e) => write!(f, "leaderboard unavailable: {e}"),
            StoreError::Rejected(e) => write!(f, "leaderboard rejected request: {e}"),
            StoreError::Malformed(e) => write!(f, "leaderboard reply malformed: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Malformed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_readable() {
        assert_eq!(GameError::NoPendingBall.to_string(), "no pending ball to launch");
        assert_eq!(
            SessionError::InvalidTransition("start a round").to_string(),
            "cannot start a round right now"
        );
        let err: StoreError = serde_json::from_str::<u32>("x").unwrap_err().into();
        assert!(matches!(err, StoreError::Malformed(_)));
    }
}
