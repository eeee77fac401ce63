//! Session configuration and lifecycle state.

use std::fmt;

use celestial_engine::Rules;
use serde::{Deserialize, Serialize};

/// Configuration for every session a [`Matchmaker`](crate::Matchmaker)
/// creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Bound of each session's command queue.
    pub channel_size: usize,

    /// Rules handed to each new game.
    pub rules: Rules,

    /// `None` seeds each session from the OS RNG. `Some(n)` makes every
    /// shuffle and the opening priority reproducible.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            channel_size: 64,
            rules: Rules::default(),
            seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

/// The lifecycle of a session.
///
/// ```text
/// AwaitingOpponent → InProgress → Finished → Closed
/// ```
///
/// A session is only ever built once both decks are known, so the first
/// state is left as soon as the game is set up. `Closed` can also be
/// reached early, when the actor is shut down mid-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// One deck is known, the other player has not arrived.
    AwaitingOpponent,
    /// The game accepts actions.
    InProgress,
    /// A winner exists. Views and polls still work.
    Finished,
    /// The actor has stopped.
    Closed,
}

impl SessionState {
    /// Returns `true` while actions can still change the game.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Returns the natural successor, or `None` from `Closed`.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::AwaitingOpponent => Some(Self::InProgress),
            Self::InProgress => Some(Self::Finished),
            Self::Finished => Some(Self::Closed),
            Self::Closed => None,
        }
    }

    /// Returns `true` if `target` is the natural successor.
    pub fn can_transition_to(&self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingOpponent => write!(f, "AwaitingOpponent"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}
