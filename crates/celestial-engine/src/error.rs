//! Error types for the engine.
//!
//! Two kinds of failure leave the engine. A [`Rejection`] means a player
//! asked for something illegal; nothing changed and the caller just tells
//! the client. Every other [`EngineError`] variant means a card effect or
//! caller broke a contract, and the session should treat it as a bug.

use celestial_protocol::{CardId, Seat};

/// Why a player action was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("the game is over")]
    GameOver,

    /// The client acted on an old version. Safe to refresh and retry.
    #[error("stale version: acted on {expected}, game is at {current}")]
    StaleVersion { expected: u64, current: u64 },

    #[error("mulligans are not complete")]
    MulligansPending,

    #[error("player does not hold priority")]
    NotYourPriority,

    #[error("mulligan already submitted")]
    MulliganAlreadySubmitted,

    #[error("mulligan mask has {got} entries, hand has {expected}")]
    MaskLength { expected: usize, got: usize },

    #[error("no card at hand index {index} (hand has {len})")]
    HandIndex { index: usize, len: usize },

    #[error("card at hand index {index} is restricted")]
    Restricted { index: usize },

    #[error("card costs {cost}, only {mana} mana available")]
    InsufficientMana { cost: i32, mana: i32 },

    /// The card's own legality hook said no.
    #[error("the card cannot be played right now")]
    CardRefused,

    #[error("cannot pass holding a playable card at full mana with an empty story")]
    PassLocked,
}

/// Errors returned by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A player action was refused. No state changed.
    #[error("action rejected: {0}")]
    Rejected(#[from] Rejection),

    /// A story operation addressed an act that doesn't exist.
    #[error("story index {index} out of range for {len} acts")]
    ActOutOfRange { index: usize, len: usize },

    /// A deck list named a card the catalog doesn't know.
    #[error("unknown card {0}")]
    UnknownCard(CardId),

    #[error("deck for {seat} has {size} cards, at least {min} required")]
    DeckTooSmall { seat: Seat, size: usize, min: usize },
}

impl EngineError {
    /// Returns `true` for player rejections, `false` for contract failures.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
