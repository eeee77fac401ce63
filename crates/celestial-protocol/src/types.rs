//! Core protocol types for Celestial's wire format.
//!
//! Everything in this module can cross the boundary between the engine
//! and a client: seat identities, card identity blocks, and the actions
//! a player submits. None of these types carry behavior; the engine
//! attaches rules to them.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// One of the two player positions at the table.
///
/// Celestial is strictly two-player, so instead of an open-ended numeric
/// id we use a two-variant enum. That makes "the other player" a total
/// function (`Seat::other`) and lets per-player arrays be indexed without
/// bounds checks failing at runtime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    /// Both seats, in table order.
    pub const BOTH: [Seat; 2] = [Seat::First, Seat::Second];

    /// Returns the position of this seat in a two-element array.
    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    /// Returns the opposing seat.
    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    /// Converts an array position back into a seat.
    ///
    /// Returns `None` for anything other than `0` or `1`.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::First),
            1 => Some(Self::Second),
            _ => None,
        }
    }

    /// Returns both seats with `self` first.
    ///
    /// Upkeep processes players in this order, starting with whoever
    /// holds priority.
    pub fn starting_with(self) -> [Seat; 2] {
        [self, self.other()]
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.index())
    }
}

/// Catalog identifier of a card.
///
/// Decks travel as ordered lists of these ids; the engine's catalog
/// turns each one into a card with behavior attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// Unique identifier of a running game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// The key two players share to be paired into the same session.
///
/// Whoever arrives first with a given slot waits; the second arrival
/// completes the match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchSlot(pub String);

impl MatchSlot {
    pub fn new(slot: impl Into<String>) -> Self {
        Self(slot.into())
    }
}

impl fmt::Display for MatchSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// A static quality printed on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    /// Goes to the expended set instead of the pile after resolving.
    Fleeting,
    /// Always visible to the opponent while in the story.
    Visible,
}

/// The identity and printed stats of a card.
///
/// This is the part of a card a client is allowed to see. Behavior lives
/// in the engine, which pairs every `CardInfo` with a set of hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    pub id: CardId,
    pub name: String,
    pub cost: i32,
    pub points: i32,
    #[serde(default)]
    pub qualities: Vec<Quality>,
    #[serde(default)]
    pub text: String,
}

impl CardInfo {
    /// Creates a card with no qualities and no text.
    pub fn new(id: u32, name: impl Into<String>, cost: i32, points: i32) -> Self {
        Self {
            id: CardId(id),
            name: name.into(),
            cost,
            points,
            qualities: Vec::new(),
            text: String::new(),
        }
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        if !self.qualities.contains(&quality) {
            self.qualities.push(quality);
        }
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Returns a copy of this info with different points.
    ///
    /// Cards never change in place; effects that "grow" a card build a
    /// new instance from this.
    pub fn with_points(&self, points: i32) -> Self {
        Self {
            points,
            ..self.clone()
        }
    }

    pub fn has(&self, quality: Quality) -> bool {
        self.qualities.contains(&quality)
    }

    pub fn is_fleeting(&self) -> bool {
        self.has(Quality::Fleeting)
    }

    pub fn is_visible(&self) -> bool {
        self.has(Quality::Visible)
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Something a player asks the engine to do.
///
/// Internally tagged so the JSON form reads `{"type":"Play","index":2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    /// Give up priority without playing.
    Pass,

    /// Play the hand card at `index`.
    Play { index: usize },

    /// Answer the opening mulligan. `mask[i] == true` throws back hand
    /// card `i`.
    Mulligan { mask: Vec<bool> },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Play { index } => write!(f, "play #{index}"),
            Self::Mulligan { mask } => {
                let thrown = mask.iter().filter(|m| **m).count();
                write!(f, "mulligan ({thrown} thrown)")
            }
        }
    }
}

/// A per-player status tag.
///
/// Tags stack: holding three `Nourish` is different from holding one.
/// Some tags are "pending" and convert into an active tag at the next
/// upkeep (`Restrict` becomes `Restricted`, `Dull` becomes `Dulled`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// +1 point to the next card that resolves for this player.
    Nourish,
    /// -1 point to the next card that resolves for this player.
    Starve,
    /// Vision is kept through upkeep instead of resetting.
    Awakened,
    /// Every card costs nothing.
    Unlocked,
    /// Becomes `Restricted` at the next upkeep.
    Restrict,
    /// The leftmost card in hand cannot be played this round, per tag.
    Restricted,
    /// Costs one mana at the next upkeep.
    Dull,
    /// Marker left by `Dull` for the round it took effect.
    Dulled,
    /// Creates a Dove in hand at the next upkeep.
    Flock,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
