//! The phase machine.
//!
//! [`TurnController`] owns a [`GameState`] and is the only thing that
//! moves it between phases. Every accepted action increments the version
//! exactly once, then mutates. When a pass ends the round, takedown and
//! the next upkeep run inside that same action.

use std::sync::Arc;

use celestial_protocol::{Action, CardId, ClientView, Phase, PollReply, Provenance, Seat, Status, Zone};

use crate::error::Rejection;
use crate::{Catalog, CardRef, GameState, PerSeat, Result, Rules, Story, catalog, view};

/// Drives one match.
#[derive(Debug)]
pub struct TurnController {
    state: GameState,
}

impl TurnController {
    /// Builds the state, shuffles, deals, and runs the first upkeep.
    /// The returned controller is waiting for mulligans.
    pub fn new(decks: [Vec<CardRef>; 2], rules: Rules, seed: Option<u64>) -> Result<Self> {
        let mut controller = Self {
            state: GameState::new(decks, rules, seed)?,
        };
        controller.setup();
        Ok(controller)
    }

    /// Like [`TurnController::new`], resolving both deck lists first.
    pub fn from_catalog(
        catalog: &Catalog,
        decks: [&[CardId]; 2],
        rules: Rules,
        seed: Option<u64>,
    ) -> Result<Self> {
        let [first, second] = decks;
        Self::new([catalog.deck(first)?, catalog.deck(second)?], rules, seed)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for scripted scenarios. Changes made here bypass
    /// validation and do not bump the version.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn version(&self) -> u64 {
        self.state.version()
    }

    pub fn winner(&self) -> Option<Seat> {
        self.state.winner()
    }

    // ----- Input -----

    /// Checks an action without applying it.
    pub fn validate(
        &self,
        seat: Seat,
        action: &Action,
        expected_version: Option<u64>,
    ) -> std::result::Result<(), Rejection> {
        let state = &self.state;
        if state.is_over() {
            return Err(Rejection::GameOver);
        }
        if let Some(expected) = expected_version {
            if expected != state.version() {
                return Err(Rejection::StaleVersion {
                    expected,
                    current: state.version(),
                });
            }
        }

        match action {
            Action::Mulligan { mask } => {
                let player = state.player(seat);
                if player.mulligan_complete() {
                    return Err(Rejection::MulliganAlreadySubmitted);
                }
                if mask.len() != player.hand().len() {
                    return Err(Rejection::MaskLength {
                        expected: player.hand().len(),
                        got: mask.len(),
                    });
                }
                Ok(())
            }
            Action::Pass | Action::Play { .. } => {
                if !state.mulligans_complete() {
                    return Err(Rejection::MulligansPending);
                }
                if state.phase() != Phase::AwaitingInput(seat) {
                    return Err(Rejection::NotYourPriority);
                }
                match action {
                    Action::Play { index } => state.check_play(seat, *index).map(|_| ()),
                    _ if self.pass_locked(seat) => Err(Rejection::PassLocked),
                    _ => Ok(()),
                }
            }
        }
    }

    /// Validates and applies an action for `seat`.
    ///
    /// A rejection leaves the state untouched, version included.
    pub fn apply_action(
        &mut self,
        seat: Seat,
        action: Action,
        expected_version: Option<u64>,
    ) -> Result<()> {
        if let Err(rejection) = self.validate(seat, &action, expected_version) {
            tracing::debug!(%seat, reason = %rejection, "action rejected");
            return Err(rejection.into());
        }

        self.state.version_increment();
        match action {
            Action::Mulligan { mask } => self.mulligan(seat, &mask),
            Action::Play { index } => self.play(seat, index)?,
            Action::Pass => self.pass(seat)?,
        }
        Ok(())
    }

    /// Ends the match in favor of `loser`'s opponent. Returns `false` if
    /// the match was already over.
    pub fn forfeit(&mut self, loser: Seat) -> bool {
        if self.state.is_over() {
            return false;
        }
        self.state.version_increment();
        self.state.winner = Some(loser.other());
        for seat in Seat::BOTH {
            self.state.player_mut(seat).mulligan_complete = true;
        }
        self.state.phase = Phase::GameOver;
        tracing::info!(%loser, winner = %loser.other(), "player forfeited");
        true
    }

    // ----- Output -----

    pub fn project_view(&self, seat: Seat, since: u64) -> ClientView {
        view::project(&self.state, seat, since)
    }

    /// `NoChange` when the client is current, else a view with everything
    /// announced after `last_seen`.
    pub fn poll(&self, seat: Seat, last_seen: u64) -> PollReply {
        if last_seen >= self.state.version() {
            PollReply::NoChange
        } else {
            PollReply::Update(Box::new(self.project_view(seat, last_seen)))
        }
    }

    // ----- Actions -----

    fn pass_locked(&self, seat: Seat) -> bool {
        let state = &self.state;
        state.player(seat).max_mana() == state.rules().mana_cap
            && state.story().is_empty()
            && state.has_playable_card(seat)
    }

    fn mulligan(&mut self, seat: Seat, mask: &[bool]) {
        let state = &mut self.state;
        let hand = std::mem::take(&mut state.player_mut(seat).hand);
        let mut thrown = 0;
        for (index, (card, throw)) in hand.into_iter().zip(mask).enumerate() {
            if *throw {
                let info = card.info().clone();
                state.player_mut(seat).deck.push(card);
                state.announce(
                    seat,
                    state.animation(Zone::Hand).to(Zone::Mulligan).card(info).at(index),
                );
                thrown += 1;
            } else {
                state.player_mut(seat).hand.push(card);
            }
        }

        state.shuffle(seat);
        state.draw(seat, thrown);
        state.player_mut(seat).mulligan_complete = true;

        if state.mulligans_complete() {
            state.phase = Phase::AwaitingInput(state.priority);
        }
        tracing::debug!(%seat, thrown, "mulligan submitted");
    }

    fn play(&mut self, seat: Seat, index: usize) -> Result<()> {
        let state = &mut self.state;
        let cost = state.check_play(seat, index)?;
        state.spend_mana(seat, cost);

        let card = state
            .take_from_hand(seat, index)
            .ok_or(Rejection::HandIndex {
                index,
                len: state.player(seat).hand().len(),
            })?;

        let replacement = card.on_play(seat, state);
        let card = match replacement {
            Some(replacement) => {
                let info = card.info().clone();
                state.player_mut(seat).expended.push(card);
                state.player_mut(seat).created += 1;
                state.announce(seat, state.animation(Zone::Story).to(Zone::Expended).card(info));
                replacement
            }
            None => card,
        };

        let mut i = 0;
        while i < state.player(seat).hand().len() {
            let other = Arc::clone(&state.player(seat).hand()[i]);
            other.in_hand_on_play(seat, state);
            i += 1;
        }

        tracing::debug!(%seat, card = %card.info().name, cost, "card played");
        state.story.add_act(card, seat, Provenance::Hand, None);
        state.passes = 0;
        state.last_player_who_played = seat;
        state.switch_priority();
        state.phase = Phase::AwaitingInput(state.priority);
        Ok(())
    }

    fn pass(&mut self, seat: Seat) -> Result<()> {
        let state = &mut self.state;
        state.passes += 1;
        state.player_mut(seat).passes += 1;
        state.switch_priority();
        state.phase = Phase::AwaitingInput(state.priority);
        tracing::debug!(%seat, passes = state.passes, "pass");

        if state.passes >= 2 {
            self.takedown()?;
            if !self.state.is_over() {
                self.upkeep();
            }
        }
        Ok(())
    }

    // ----- Phases -----

    fn setup(&mut self) {
        let state = &mut self.state;
        state.version_increment();
        state.phase = Phase::Setup;
        let start_hand = state.rules().start_hand;
        for seat in Seat::BOTH {
            state.shuffle(seat);
            state.draw(seat, start_hand);
        }
        tracing::debug!(priority = %state.priority, "setup complete");
        self.upkeep();
    }

    fn upkeep(&mut self) {
        let state = &mut self.state;
        state.phase = Phase::Upkeep;
        state.passes = 0;
        state.priority = state.last_player_who_played;
        let order = state.priority.starting_with();

        let rules = state.rules().clone();
        for seat in order {
            let player = state.player_mut(seat);
            player.passes = 0;
            player.drawn = 0;
            player.score = 0;
            player.max_mana = (player.max_mana + rules.mana_gain_per_turn).min(rules.mana_cap);
            player.mana = player.max_mana;
        }

        for seat in order {
            Self::settle_statuses(state, seat);
        }

        for seat in order {
            let mut i = 0;
            while i < state.player(seat).hand().len() {
                let card = Arc::clone(&state.player(seat).hand()[i]);
                if card.on_upkeep(seat, state, i) {
                    let info = card.info().clone();
                    state.announce(
                        seat,
                        state.animation(Zone::Hand).to(Zone::Hand).card(info).at(i).landing(i),
                    );
                }
                i += 1;
            }
        }

        for seat in order {
            let top = state.player(seat).pile().last().cloned();
            if let Some(card) = top {
                let index = state.player(seat).pile().len() - 1;
                card.morning(seat, state, index);
            }
        }

        for seat in order {
            state.draw(seat, rules.draw_per_turn);
            let player = state.player_mut(seat);
            player.mana = player.mana.clamp(0, player.max_mana);
        }

        state.phase = if state.mulligans_complete() {
            Phase::AwaitingInput(state.priority)
        } else {
            Phase::Mulligan
        };
        tracing::debug!(round = state.round, priority = %state.priority, "upkeep complete");
    }

    /// Start-of-round status bookkeeping for one player.
    fn settle_statuses(state: &mut GameState, seat: Seat) {
        let player = state.player_mut(seat);
        if !player.status.has(Status::Awakened) {
            player.vision = 0;
        }
        player.status.clear(Status::Restricted);
        player.status.clear(Status::Dulled);

        let dull = player.status.clear(Status::Dull);
        player.mana -= dull as i32;
        let restrict = player.status.clear(Status::Restrict);
        let flock = player.status.clear(Status::Flock);

        state.add_status(seat, Status::Dulled, dull);
        state.add_status(seat, Status::Restricted, restrict);
        for _ in 0..flock {
            state.create_card(seat, catalog::dove());
        }
    }

    fn takedown(&mut self) -> Result<()> {
        let state = &mut self.state;
        state.phase = Phase::Takedown;
        for seat in Seat::BOTH {
            state.player_mut(seat).score = 0;
        }
        state.recap.reset();

        Self::spring(state);
        Story::run(state)?;

        let scores = PerSeat::from_fn(|seat| state.player(seat).score());
        for seat in Seat::BOTH {
            let player = state.player_mut(seat);
            player.round_results.push(scores[seat]);
            if scores[seat] > scores[seat.other()] {
                player.wins += 1;
            }
        }
        state.round += 1;

        let wins_to_win = state.rules().wins_to_win;
        state.winner = Seat::BOTH
            .into_iter()
            .find(|seat| state.player(*seat).wins() >= wins_to_win);

        let wins = PerSeat::from_fn(|seat| state.player(seat).wins());
        let last = PerSeat::from_fn(|seat| view::snapshot(state, seat));
        state.recap.finish(scores.clone(), wins.clone(), last);
        state.story.clear();

        tracing::info!(
            round = state.round,
            first = scores[Seat::First],
            second = scores[Seat::Second],
            wins_first = wins[Seat::First],
            wins_second = wins[Seat::Second],
            "round settled"
        );
        if let Some(winner) = state.winner {
            state.phase = Phase::GameOver;
            tracing::info!(%winner, rounds = state.round, "game over");
        }
        Ok(())
    }

    /// Leftmost springing cards jump into the story, priority first.
    fn spring(state: &mut GameState) {
        for seat in state.priority.starting_with() {
            let player = state.player(seat);
            if player.status().has(Status::Restricted) {
                continue;
            }
            let springs = player.hand().first().is_some_and(|card| card.springs());
            if !springs {
                continue;
            }
            if let Some(card) = state.take_from_hand(seat, 0) {
                state.story.add_act(card, seat, Provenance::Sprung, None);
            }
        }
    }
}
