//! Game constants.

use serde::{Deserialize, Serialize};

/// The numeric rules of a match.
///
/// Every value a rule depends on lives here rather than as a scattered
/// constant, so a session can be built with shorter matches for tests
/// or alternate formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    /// Cards drawn during setup, before the first upkeep draws.
    pub start_hand: usize,

    /// Cards each player draws at the end of every upkeep.
    pub draw_per_turn: usize,

    /// Hand capacity. Draws and creations stop when the hand is full.
    pub hand_cap: usize,

    /// Max mana gained at every upkeep.
    pub mana_gain_per_turn: i32,

    /// Max mana before the first upkeep.
    pub start_mana: i32,

    /// Upper bound for max mana.
    pub mana_cap: i32,

    /// Round wins needed to take the match.
    pub wins_to_win: u32,

    /// Smallest deck a session accepts. 0 accepts anything.
    pub min_deck_size: usize,
}

impl Rules {
    /// Hand size once mulligans open: setup draws plus the first upkeep's.
    pub fn start_hand_real(&self) -> usize {
        self.start_hand + self.draw_per_turn
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            start_hand: 1,
            draw_per_turn: 2,
            hand_cap: 6,
            mana_gain_per_turn: 1,
            start_mana: 0,
            mana_cap: 10,
            wins_to_win: 5,
            min_deck_size: 0,
        }
    }
}
