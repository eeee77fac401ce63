//! The story: the queue of acts that resolve at takedown.
//!
//! Cards played during a round don't score immediately. Each becomes an
//! [`Act`] at the tail of the [`Story`], and at takedown the story is
//! drained from the head. While acts wait, effects may counter, reorder,
//! remove, or replace them; while the story drains, resolving cards may
//! add more acts, which are processed in the same run.

use std::collections::VecDeque;
use std::sync::Arc;

use celestial_protocol::{Provenance, Seat};

use crate::{CardRef, EngineError, GameState, Result};

/// Recap text for an act that was countered.
pub const COUNTERED: &str = "Countered";

/// A card waiting in the story.
#[derive(Debug)]
pub struct Act {
    pub card: CardRef,
    pub owner: Seat,
    pub provenance: Provenance,
    pub countered: bool,
    /// Extra points granted by other effects while this act waited.
    pub bonus: i32,
}

impl Act {
    pub fn new(card: CardRef, owner: Seat, provenance: Provenance) -> Self {
        Self {
            card,
            owner,
            provenance,
            countered: false,
            bonus: 0,
        }
    }
}

/// The ordered queue of acts for the current round.
#[derive(Debug, Default)]
pub struct Story {
    acts: VecDeque<Act>,
}

impl Story {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a card. `position` inserts before the act currently at
    /// that index (clamped to the tail); `None` appends.
    pub fn add_act(
        &mut self,
        card: CardRef,
        owner: Seat,
        provenance: Provenance,
        position: Option<usize>,
    ) {
        self.insert(Act::new(card, owner, provenance), position);
    }

    /// Enqueues a prepared act, keeping its flags and bonus.
    pub fn insert(&mut self, act: Act, position: Option<usize>) {
        match position {
            Some(i) => {
                let i = i.min(self.acts.len());
                self.acts.insert(i, act);
            }
            None => self.acts.push_back(act),
        }
    }

    /// Flags the first act matching `predicate` and returns its card.
    ///
    /// Only one act is countered per call, even when several match. If the
    /// first match is already countered the call changes nothing.
    pub fn counter(&mut self, predicate: impl Fn(&Act) -> bool) -> Option<CardRef> {
        let act = self.acts.iter_mut().find(|act| predicate(act))?;
        act.countered = true;
        Some(Arc::clone(&act.card))
    }

    /// Moves the act at `from` so that it ends up at index `to`.
    ///
    /// Both indices refer to the queue as it is when the call is made,
    /// and `to` is the act's final position. Moving several acts means
    /// re-reading positions between calls.
    pub fn move_act(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.acts.len();
        if from >= len {
            return Err(EngineError::ActOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(EngineError::ActOutOfRange { index: to, len });
        }
        if let Some(act) = self.acts.remove(from) {
            self.acts.insert(to, act);
        }
        Ok(())
    }

    /// Removes and returns the act at `index`.
    pub fn remove_act(&mut self, index: usize) -> Result<Act> {
        let len = self.acts.len();
        self.acts
            .remove(index)
            .ok_or(EngineError::ActOutOfRange { index, len })
    }

    /// Puts `act` at `index` and returns the act it displaced.
    pub fn replace_act(&mut self, index: usize, act: Act) -> Result<Act> {
        let len = self.acts.len();
        let slot = self
            .acts
            .get_mut(index)
            .ok_or(EngineError::ActOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, act))
    }

    pub fn get(&self, index: usize) -> Option<&Act> {
        self.acts.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Act> {
        self.acts.get_mut(index)
    }

    pub fn acts(&self) -> impl Iterator<Item = &Act> {
        self.acts.iter()
    }

    pub fn len(&self) -> usize {
        self.acts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acts.is_empty()
    }

    pub fn clear(&mut self) {
        self.acts.clear();
    }

    /// Number of acts owned by `seat`.
    pub fn count_owned_by(&self, seat: Seat) -> usize {
        self.acts.iter().filter(|a| a.owner == seat).count()
    }

    fn pop_front(&mut self) -> Option<Act> {
        self.acts.pop_front()
    }

    /// Drains the story held by `state`, resolving every act.
    ///
    /// Countered acts record [`COUNTERED`] and skip their effect. Every
    /// other act calls `play` (or `play_spring` for sprung acts) and
    /// records the returned text. Either way the card then moves to its
    /// owner's pile, or to the expended set if it is fleeting. A recap
    /// snapshot is taken before the first act and after each one.
    ///
    /// The loop re-checks the queue every iteration, so acts added by a
    /// resolving card are resolved in the same run. Round-end hooks of
    /// the resolved cards fire after the queue is empty, in resolution
    /// order.
    pub fn run(state: &mut GameState) -> Result<()> {
        state.record_snapshot();

        let mut resolved: Vec<(CardRef, Seat)> = Vec::new();
        let mut index = 0;

        while let Some(act) = state.story_mut().pop_front() {
            let Act {
                card,
                owner,
                provenance,
                countered,
                bonus,
            } = act;

            let result = if countered {
                Ok(COUNTERED.to_string())
            } else if provenance == Provenance::Sprung {
                card.play_spring(owner, state, index, bonus)
            } else {
                card.play(owner, state, index, bonus)
            };
            let result = match result {
                Ok(text) => text,
                Err(e) => {
                    // The popped card still belongs somewhere.
                    state.retire(owner, card, index);
                    return Err(e);
                }
            };

            tracing::trace!(%owner, card = %card.info().name, %result, "act resolved");
            state.record_recap_line(card.info().clone(), owner, result);

            if !countered {
                resolved.push((Arc::clone(&card), owner));
            }
            state.retire(owner, card, index);
            state.record_snapshot();
            index += 1;
        }

        for (card, owner) in resolved {
            card.on_round_end(owner, state);
        }

        Ok(())
    }
}
