//! Error types for the session layer.

use celestial_engine::{EngineError, Rejection};
use celestial_protocol::{MatchSlot, SessionId};

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session actor has stopped or its queue is closed.
    #[error("session {0} is unavailable")]
    Unavailable(SessionId),

    /// The engine refused an action or hit a broken contract.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The player was waiting in a slot that got cancelled.
    #[error("match in slot {0} was cancelled")]
    MatchCancelled(MatchSlot),

    /// The operation is invalid in the session's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl SessionError {
    /// The rejection reason, if this is a refused player action.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Engine(e) => e.rejection(),
            _ => None,
        }
    }
}
