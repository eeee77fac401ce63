//! The `Card` trait: the hook points every card can implement.
//!
//! The engine never matches on card identity. It calls hooks at fixed
//! moments (cost check, play, resolution, upkeep, morning, round end) and
//! every card overrides only the moments it cares about. Everything else
//! falls back to the defaults here, which describe a vanilla card: its
//! printed cost, always playable, worth its printed points.

use std::fmt;
use std::sync::Arc;

use celestial_protocol::{CardInfo, Seat, Status};

use crate::{GameState, Result};

/// A shared handle to an immutable card.
///
/// Zones hold these and move them from one vector to another; a card is
/// never in two zones at once. Cloning the handle (for example to call a
/// hook on a card that stays in hand) does not create a second card.
pub type CardRef = Arc<dyn Card>;

/// Behavior attached to a card.
///
/// Hooks receive the owning player and the live game state. Cost and
/// legality hooks take `&GameState` and must be pure functions of it.
pub trait Card: Send + Sync + fmt::Debug {
    /// Identity and printed stats.
    fn info(&self) -> &CardInfo;

    /// The cost to play this card right now, before status overrides.
    fn cost(&self, _player: Seat, _state: &GameState) -> i32 {
        self.info().cost
    }

    /// Card-specific legality. Checked after bounds, restriction, and cost.
    fn can_play(&self, _player: Seat, _state: &GameState) -> bool {
        true
    }

    /// Runs when the card leaves hand. Returning a card substitutes the
    /// instance that will enter the story.
    fn on_play(&self, _player: Seat, _state: &mut GameState) -> Option<CardRef> {
        None
    }

    /// Resolves the card during takedown. `index` counts the acts that
    /// resolved before this one; `bonus` was accumulated while queued.
    ///
    /// Returns the text shown in the recap.
    fn play(&self, player: Seat, state: &mut GameState, _index: usize, bonus: i32) -> Result<String> {
        Ok(award_points(self.info(), player, state, bonus))
    }

    /// Resolves the card when it sprang from hand instead of being played.
    fn play_spring(
        &self,
        player: Seat,
        state: &mut GameState,
        index: usize,
        bonus: i32,
    ) -> Result<String> {
        self.play(player, state, index, bonus)
    }

    /// Upkeep trigger while in hand. Returns `true` if something happened.
    fn on_upkeep(&self, _player: Seat, _state: &mut GameState, _index: usize) -> bool {
        false
    }

    /// Upkeep trigger while on top of the pile. Returns `true` if
    /// something happened.
    fn morning(&self, _player: Seat, _state: &mut GameState, _index: usize) -> bool {
        false
    }

    /// Runs for every card left in hand after its owner plays another.
    fn in_hand_on_play(&self, _player: Seat, _state: &mut GameState) {}

    /// Runs once the story has drained, for each card that resolved.
    fn on_round_end(&self, _player: Seat, _state: &mut GameState) {}

    /// Whether this card springs into the story from the leftmost hand
    /// slot at the start of takedown.
    fn springs(&self) -> bool {
        false
    }
}

/// A card with no behavior beyond its printed stats.
#[derive(Debug)]
pub struct Vanilla {
    info: CardInfo,
}

impl Vanilla {
    pub fn card(info: CardInfo) -> CardRef {
        Arc::new(Self { info })
    }
}

impl Card for Vanilla {
    fn info(&self) -> &CardInfo {
        &self.info
    }
}

/// Scores a resolving card for `player`.
///
/// Adds printed points, `bonus`, and one point per `Nourish` minus one
/// per `Starve`, consuming both. This is the default `play`; cards that
/// override `play` call it to keep the base behavior.
pub fn award_points(info: &CardInfo, player: Seat, state: &mut GameState, bonus: i32) -> String {
    let result = pending_points(info, player, state, bonus);
    state.clear_status(player, Status::Nourish);
    state.clear_status(player, Status::Starve);
    state.add_score(player, result);
    format_points(result)
}

/// What [`award_points`] would score, without consuming anything.
pub fn pending_points(info: &CardInfo, player: Seat, state: &GameState, bonus: i32) -> i32 {
    let ledger = state.player(player).status();
    info.points + bonus + ledger.count(Status::Nourish) as i32 - ledger.count(Status::Starve) as i32
}

/// Formats a point delta for the recap: `+3`, `0`, `-2`.
pub fn format_points(points: i32) -> String {
    if points > 0 {
        format!("+{points}")
    } else {
        points.to_string()
    }
}
