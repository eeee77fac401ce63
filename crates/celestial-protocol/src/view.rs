//! Player-scoped views of a game.
//!
//! A [`ClientView`] is what one player is allowed to know about the game
//! at a given version. The engine builds it; transport serializes it. All
//! per-player fields are relative to the viewer (`me` / `opponent`), so a
//! client never has to know which seat it sits in to render the board.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CardInfo, Seat, Status};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a game is in its round structure.
///
/// ```text
/// Setup → Mulligan → Upkeep → AwaitingInput(p) ⇄ AwaitingInput(q)
///       → Takedown → Upkeep → … → GameOver
/// ```
///
/// `Setup`, `Upkeep`, and `Takedown` are transient: they run to
/// completion inside a single accepted action, so a client only ever
/// observes `Mulligan`, `AwaitingInput`, or `GameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    Mulligan,
    Upkeep,
    AwaitingInput(Seat),
    Takedown,
    GameOver,
}

impl Phase {
    /// Returns `true` if turn actions (pass/play) can be accepted.
    pub fn accepts_turn_actions(&self) -> bool {
        matches!(self, Self::AwaitingInput(_))
    }

    /// Returns `true` once the game has a winner.
    pub fn is_over(&self) -> bool {
        matches!(self, Self::GameOver)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "Setup"),
            Self::Mulligan => write!(f, "Mulligan"),
            Self::Upkeep => write!(f, "Upkeep"),
            Self::AwaitingInput(seat) => write!(f, "AwaitingInput({seat})"),
            Self::Takedown => write!(f, "Takedown"),
            Self::GameOver => write!(f, "GameOver"),
        }
    }
}

// ---------------------------------------------------------------------------
// Story and animations
// ---------------------------------------------------------------------------

/// How an act entered the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Played from hand by the owner.
    Hand,
    /// Sprung from hand at the start of takedown.
    Sprung,
    /// Put into the story by an effect from the pile.
    Pile,
}

/// A location cards move between, for animation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    Deck,
    Hand,
    Pile,
    Expended,
    Story,
    Mulligan,
    /// Nowhere: the source of created cards.
    Gone,
    Shuffle,
    Status,
    Transform,
}

/// One announced card movement or event.
///
/// `version` is the game version the announcement belongs to, so a client
/// can ask for "everything after the last version I saw".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    pub version: u64,
    pub from: Zone,
    pub to: Option<Zone>,
    pub card: Option<CardInfo>,
    pub index: Option<usize>,
    pub index2: Option<usize>,
    pub status: Option<Status>,
}

impl Animation {
    /// Starts an announcement of something leaving `from`.
    pub fn from_zone(version: u64, from: Zone) -> Self {
        Self {
            version,
            from,
            to: None,
            card: None,
            index: None,
            index2: None,
            status: None,
        }
    }

    pub fn to(mut self, zone: Zone) -> Self {
        self.to = Some(zone);
        self
    }

    pub fn card(mut self, card: CardInfo) -> Self {
        self.card = Some(card);
        self
    }

    /// Index in the origin zone.
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Index in the destination zone.
    pub fn landing(mut self, index: usize) -> Self {
        self.index2 = Some(index);
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }
}

/// One act in the story, as seen by a particular player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActView {
    /// `true` if the viewer owns this act.
    pub mine: bool,
    /// `None` when the act is hidden from the viewer.
    pub card: Option<CardInfo>,
    pub provenance: Provenance,
    pub countered: bool,
}

// ---------------------------------------------------------------------------
// Per-player views
// ---------------------------------------------------------------------------

/// A pair of values from the viewer's perspective.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally<T> {
    pub me: T,
    pub opponent: T,
}

/// A card in the viewer's own hand, with its legality precomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandCard {
    pub card: CardInfo,
    /// Dynamic cost right now, after status overrides.
    pub cost: i32,
    /// Whether `Play` on this card would currently be accepted.
    pub playable: bool,
}

/// What the viewer may know about the opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentView {
    pub hand_size: usize,
    pub deck_size: usize,
    pub pile: Vec<CardInfo>,
    pub expended: Vec<CardInfo>,
    pub max_mana: i32,
    pub mulligan_complete: bool,
}

/// The result of a round for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Win,
    Lose,
    Tie,
}

/// One resolved act in the recap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecapLine {
    pub card: CardInfo,
    pub mine: bool,
    /// The text the card reported, such as `"+3"` or `"Countered"`.
    pub result: String,
}

/// The last takedown, from the viewer's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecapView {
    pub lines: Vec<RecapLine>,
    pub scores: Tally<i32>,
    pub wins: Tally<u32>,
    /// Snapshots before the first act and after each act.
    pub snapshots: Vec<ClientView>,
    pub outcome: Option<RoundOutcome>,
}

/// Everything one player is allowed to see at a given version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientView {
    pub version: u64,
    pub seat: Seat,
    pub phase: Phase,
    pub has_priority: bool,
    pub round: u32,

    pub hand: Vec<HandCard>,
    /// Own deck contents, sorted by cost then name so order leaks nothing.
    pub deck: Vec<CardInfo>,
    pub pile: Vec<CardInfo>,
    pub expended: Vec<CardInfo>,
    pub opponent: OpponentView,
    pub story: Vec<ActView>,

    pub mana: i32,
    pub max_mana: i32,
    pub vision: u32,
    pub statuses: Vec<(Status, usize)>,
    pub mulligan_complete: bool,

    pub score: Tally<i32>,
    pub wins: Tally<u32>,
    pub passes: Tally<u32>,
    pub round_results: Tally<Vec<i32>>,
    pub winner: Option<Seat>,

    /// Announcements newer than the version the viewer last saw. The
    /// opponent's side has cards they drew masked out.
    pub animations: Tally<Vec<Animation>>,
    pub recap: Option<Box<RecapView>>,
    /// `true` for snapshots inside a recap, which reveal the whole story.
    pub is_recap: bool,
    /// Set on the final recap snapshot of a round.
    pub outcome: Option<RoundOutcome>,
}

impl ClientView {
    /// Returns the indices of every hand card that can be played now.
    pub fn playable_indices(&self) -> Vec<usize> {
        self.hand
            .iter()
            .enumerate()
            .filter(|(_, c)| c.playable)
            .map(|(i, _)| i)
            .collect()
    }
}

/// The answer to a version poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollReply {
    /// The session version equals the version the client last saw.
    NoChange,
    /// A fresh view stamped with the current version.
    Update(Box<ClientView>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_accepts_turn_actions_only_when_awaiting_input() {
        assert!(Phase::AwaitingInput(Seat::First).accepts_turn_actions());
        assert!(!Phase::Mulligan.accepts_turn_actions());
        assert!(!Phase::Takedown.accepts_turn_actions());
        assert!(!Phase::GameOver.accepts_turn_actions());
    }

    #[test]
    fn test_phase_display_includes_seat() {
        assert_eq!(
            Phase::AwaitingInput(Seat::Second).to_string(),
            "AwaitingInput(S-1)"
        );
        assert_eq!(Phase::GameOver.to_string(), "GameOver");
    }

    #[test]
    fn test_tally_default_is_zeroed() {
        let t: Tally<i32> = Tally::default();
        assert_eq!(t.me, 0);
        assert_eq!(t.opponent, 0);
    }

    #[test]
    fn test_poll_reply_no_change_serializes_as_string() {
        let json = serde_json::to_string(&PollReply::NoChange).unwrap();
        assert_eq!(json, "\"NoChange\"");
    }
}
