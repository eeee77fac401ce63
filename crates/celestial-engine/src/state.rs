//! The game state aggregate and the named operations that mutate it.
//!
//! Everything that changes during a match lives in [`GameState`]: the
//! four zones of each player, mana, statuses, scores, the story, the
//! recap, priority, and the version counter. Reads are open. Writes go
//! through named operations so every zone movement is announced to the
//! owner's animation log and card ownership is always transferred, never
//! duplicated.

use celestial_protocol::{Animation, CardInfo, Phase, Provenance, Seat, Status, Zone};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::Rejection;
use crate::story::Story;
use crate::{CardRef, EngineError, PerSeat, Recap, Result, Rules, StatusLedger, view};

// ---------------------------------------------------------------------------
// PlayerState
// ---------------------------------------------------------------------------

/// One player's zones and counters.
#[derive(Debug, Default)]
pub struct PlayerState {
    pub(crate) deck: Vec<CardRef>,
    pub(crate) hand: Vec<CardRef>,
    pub(crate) pile: Vec<CardRef>,
    pub(crate) expended: Vec<CardRef>,

    pub(crate) mana: i32,
    pub(crate) max_mana: i32,
    pub(crate) wins: u32,
    pub(crate) score: i32,
    pub(crate) vision: u32,
    pub(crate) status: StatusLedger,
    pub(crate) mulligan_complete: bool,

    /// Passes this round.
    pub(crate) passes: u32,
    /// Cards drawn this round.
    pub(crate) drawn: u32,
    pub(crate) round_results: Vec<i32>,

    /// Cards that entered this player's zones through a create effect.
    pub(crate) created: usize,
    pub(crate) starting_deck: usize,

    pub(crate) animations: Vec<Animation>,
}

impl PlayerState {
    fn with_deck(deck: Vec<CardRef>, start_mana: i32) -> Self {
        Self {
            starting_deck: deck.len(),
            deck,
            mana: start_mana,
            max_mana: start_mana,
            ..Self::default()
        }
    }

    /// The deck, top card last.
    pub fn deck(&self) -> &[CardRef] {
        &self.deck
    }

    pub fn hand(&self) -> &[CardRef] {
        &self.hand
    }

    /// The pile, top card last.
    pub fn pile(&self) -> &[CardRef] {
        &self.pile
    }

    pub fn expended(&self) -> &[CardRef] {
        &self.expended
    }

    pub fn mana(&self) -> i32 {
        self.mana
    }

    pub fn max_mana(&self) -> i32 {
        self.max_mana
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn vision(&self) -> u32 {
        self.vision
    }

    pub fn status(&self) -> &StatusLedger {
        &self.status
    }

    pub fn mulligan_complete(&self) -> bool {
        self.mulligan_complete
    }

    pub fn passes(&self) -> u32 {
        self.passes
    }

    pub fn drawn(&self) -> u32 {
        self.drawn
    }

    pub fn round_results(&self) -> &[i32] {
        &self.round_results
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn starting_deck_size(&self) -> usize {
        self.starting_deck
    }

    /// Cards across deck, hand, pile, and expended.
    pub fn card_count(&self) -> usize {
        self.deck.len() + self.hand.len() + self.pile.len() + self.expended.len()
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// The single mutable aggregate of a match.
#[derive(Debug)]
pub struct GameState {
    pub(crate) rules: Rules,
    pub(crate) players: PerSeat<PlayerState>,
    pub(crate) story: Story,
    pub(crate) recap: Recap,
    pub(crate) phase: Phase,
    pub(crate) priority: Seat,
    /// Consecutive passes since the last play.
    pub(crate) passes: u32,
    pub(crate) last_player_who_played: Seat,
    pub(crate) round: u32,
    pub(crate) winner: Option<Seat>,
    pub(crate) version: u64,
    rng: StdRng,
}

impl GameState {
    /// Builds a fresh state around two decks, top card last.
    ///
    /// `seed` makes shuffles and the opening priority reproducible;
    /// `None` seeds from the operating system.
    pub fn new(decks: [Vec<CardRef>; 2], rules: Rules, seed: Option<u64>) -> Result<Self> {
        for (seat, deck) in Seat::BOTH.into_iter().zip(decks.iter()) {
            if deck.len() < rules.min_deck_size {
                return Err(EngineError::DeckTooSmall {
                    seat,
                    size: deck.len(),
                    min: rules.min_deck_size,
                });
            }
        }

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let opening = if rng.random_bool(0.5) {
            Seat::First
        } else {
            Seat::Second
        };

        let [first, second] = decks;
        let players = PerSeat::new(
            PlayerState::with_deck(first, rules.start_mana),
            PlayerState::with_deck(second, rules.start_mana),
        );

        Ok(Self {
            rules,
            players,
            story: Story::new(),
            recap: Recap::default(),
            phase: Phase::Setup,
            priority: opening,
            passes: 0,
            last_player_who_played: opening,
            round: 0,
            winner: None,
            version: 0,
            rng,
        })
    }

    // ----- Reads -----

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn player(&self, seat: Seat) -> &PlayerState {
        &self.players[seat]
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn recap(&self) -> &Recap {
        &self.recap
    }

    /// The current phase. Reports `GameOver` as soon as a winner exists.
    pub fn phase(&self) -> Phase {
        if self.winner.is_some() {
            Phase::GameOver
        } else {
            self.phase
        }
    }

    pub fn priority(&self) -> Seat {
        self.priority
    }

    /// Consecutive passes since the last play.
    pub fn consecutive_passes(&self) -> u32 {
        self.passes
    }

    pub fn last_player_who_played(&self) -> Seat {
        self.last_player_who_played
    }

    /// Rounds settled so far.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn mulligans_complete(&self) -> bool {
        self.players.iter().all(|(_, p)| p.mulligan_complete)
    }

    // ----- Costs and legality -----

    /// What `card` costs `player` right now. `Unlocked` forces zero; no
    /// card costs less than zero.
    pub fn card_cost(&self, player: Seat, card: &CardRef) -> i32 {
        if self.players[player].status.has(Status::Unlocked) {
            0
        } else {
            card.cost(player, self).max(0)
        }
    }

    /// Cost of the hand card at `index`, if there is one.
    pub fn cost_of(&self, player: Seat, index: usize) -> Option<i32> {
        self.players[player]
            .hand
            .get(index)
            .map(|card| self.card_cost(player, card))
    }

    /// Checks whether `player` could play hand card `index`, ignoring
    /// priority. Returns the cost on success.
    pub fn check_play(&self, player: Seat, index: usize) -> std::result::Result<i32, Rejection> {
        let p = &self.players[player];
        let card = p.hand.get(index).ok_or(Rejection::HandIndex {
            index,
            len: p.hand.len(),
        })?;
        if index < p.status.count(Status::Restricted) {
            return Err(Rejection::Restricted { index });
        }
        let cost = self.card_cost(player, card);
        if cost > p.mana {
            return Err(Rejection::InsufficientMana { cost, mana: p.mana });
        }
        if !card.can_play(player, self) {
            return Err(Rejection::CardRefused);
        }
        Ok(cost)
    }

    pub fn can_play(&self, player: Seat, index: usize) -> bool {
        self.check_play(player, index).is_ok()
    }

    pub fn has_playable_card(&self, player: Seat) -> bool {
        (0..self.players[player].hand.len()).any(|i| self.can_play(player, i))
    }

    /// Whether `viewer` can see the story act at `index`: their own acts
    /// always, the opponent's within the vision window or when visible.
    pub fn can_see_act(&self, viewer: Seat, index: usize) -> bool {
        match self.story.get(index) {
            Some(act) if act.owner == viewer => true,
            Some(act) => {
                index < self.players[viewer].vision as usize || act.card.info().is_visible()
            }
            None => false,
        }
    }

    /// How many of the opponent's acts `player` can currently see.
    pub fn seen_acts(&self, player: Seat) -> usize {
        (0..self.story.len())
            .filter(|i| {
                self.story.get(*i).is_some_and(|a| a.owner != player) && self.can_see_act(player, *i)
            })
            .count()
    }

    // ----- Named operations -----

    /// Moves up to `n` cards from the top of the deck into hand, stopping
    /// at hand capacity. An empty deck is not an error. Returns the
    /// number of cards drawn.
    pub fn draw(&mut self, player: Seat, n: usize) -> usize {
        let cap = self.rules.hand_cap;
        let mut drawn = 0;
        while drawn < n && self.players[player].hand.len() < cap {
            let p = &mut self.players[player];
            let Some(card) = p.deck.pop() else {
                break;
            };
            let info = card.info().clone();
            p.hand.push(card);
            p.drawn += 1;
            let landing = p.hand.len() - 1;
            self.announce(
                player,
                self.animation(Zone::Deck).to(Zone::Hand).card(info).landing(landing),
            );
            drawn += 1;
        }
        drawn
    }

    pub fn shuffle(&mut self, player: Seat) {
        let deck = &mut self.players[player].deck;
        deck.shuffle(&mut self.rng);
        if !deck.is_empty() {
            self.announce(player, self.animation(Zone::Shuffle));
        }
    }

    /// Puts a newly created card into hand. Returns `false` (and creates
    /// nothing) if the hand is full.
    pub fn create_card(&mut self, player: Seat, card: CardRef) -> bool {
        if self.players[player].hand.len() >= self.rules.hand_cap {
            return false;
        }
        let info = card.info().clone();
        let p = &mut self.players[player];
        p.hand.push(card);
        p.created += 1;
        let landing = p.hand.len() - 1;
        self.announce(
            player,
            self.animation(Zone::Gone).to(Zone::Hand).card(info).landing(landing),
        );
        true
    }

    pub fn create_in_pile(&mut self, player: Seat, card: CardRef) {
        let info = card.info().clone();
        let p = &mut self.players[player];
        p.pile.push(card);
        p.created += 1;
        let landing = p.pile.len() - 1;
        self.announce(
            player,
            self.animation(Zone::Gone).to(Zone::Pile).card(info).landing(landing),
        );
    }

    /// Creates a card on top of the deck.
    pub fn create_on_deck(&mut self, player: Seat, card: CardRef) {
        let info = card.info().clone();
        let p = &mut self.players[player];
        p.deck.push(card);
        p.created += 1;
        self.announce(player, self.animation(Zone::Gone).to(Zone::Deck).card(info));
    }

    /// Creates a card straight into the story.
    pub fn create_in_story(&mut self, player: Seat, card: CardRef, position: Option<usize>) {
        let info = card.info().clone();
        self.players[player].created += 1;
        self.story.add_act(card, player, Provenance::Pile, position);
        self.announce(player, self.animation(Zone::Gone).to(Zone::Story).card(info));
    }

    pub fn add_status(&mut self, player: Seat, tag: Status, n: usize) {
        if n == 0 {
            return;
        }
        self.players[player].status.add(tag, n);
        self.announce(player, self.animation(Zone::Status).status(tag));
    }

    /// Removes every copy of `tag` and returns how many there were.
    pub fn clear_status(&mut self, player: Seat, tag: Status) -> usize {
        self.players[player].status.clear(tag)
    }

    pub fn switch_priority(&mut self) {
        self.priority = self.priority.other();
    }

    pub fn version_increment(&mut self) {
        self.version += 1;
    }

    pub fn add_score(&mut self, player: Seat, points: i32) {
        self.players[player].score += points;
    }

    /// Sets the round score to zero and returns what it was.
    pub fn reset_score(&mut self, player: Seat) -> i32 {
        std::mem::take(&mut self.players[player].score)
    }

    /// Widens the player's view into the opponent's side of the story.
    pub fn sight(&mut self, player: Seat, amount: u32) {
        self.players[player].vision += amount;
    }

    /// Adds mana without exceeding max mana.
    pub fn gain_mana(&mut self, player: Seat, amount: i32) {
        let p = &mut self.players[player];
        p.mana = (p.mana + amount).clamp(0, p.max_mana);
    }

    /// Spends `amount` mana if the player has it.
    pub fn exhale(&mut self, player: Seat, amount: i32) -> bool {
        let p = &mut self.players[player];
        if p.mana >= amount {
            p.mana -= amount;
            true
        } else {
            false
        }
    }

    /// Moves up to `n` cards from the left of the hand to the pile.
    pub fn discard(&mut self, player: Seat, n: usize) -> usize {
        let mut moved = 0;
        while moved < n && !self.players[player].hand.is_empty() {
            let p = &mut self.players[player];
            let card = p.hand.remove(0);
            let info = card.info().clone();
            p.pile.push(card);
            let landing = p.pile.len() - 1;
            self.announce(
                player,
                self.animation(Zone::Hand)
                    .to(Zone::Pile)
                    .card(info)
                    .at(0)
                    .landing(landing),
            );
            moved += 1;
        }
        moved
    }

    /// Moves up to `n` cards from the top of the deck to the pile.
    pub fn mill(&mut self, player: Seat, n: usize) -> usize {
        let mut moved = 0;
        while moved < n {
            let p = &mut self.players[player];
            let Some(card) = p.deck.pop() else {
                break;
            };
            let info = card.info().clone();
            p.pile.push(card);
            self.announce(player, self.animation(Zone::Deck).to(Zone::Pile).card(info));
            moved += 1;
        }
        moved
    }

    /// Moves up to `n` cards from the top of the pile to the expended set.
    pub fn dig(&mut self, player: Seat, n: usize) -> usize {
        let mut moved = 0;
        while moved < n {
            let p = &mut self.players[player];
            let Some(card) = p.pile.pop() else {
                break;
            };
            let info = card.info().clone();
            p.expended.push(card);
            self.announce(player, self.animation(Zone::Pile).to(Zone::Expended).card(info));
            moved += 1;
        }
        moved
    }

    /// Puts the hand card at `index` on the bottom of the deck.
    pub fn bottom(&mut self, player: Seat, index: usize) -> bool {
        let p = &mut self.players[player];
        if index >= p.hand.len() {
            return false;
        }
        let card = p.hand.remove(index);
        let info = card.info().clone();
        p.deck.insert(0, card);
        self.announce(
            player,
            self.animation(Zone::Hand).to(Zone::Deck).card(info).at(index),
        );
        true
    }

    /// Takes the topmost deck card with printed cost `cost` into hand.
    pub fn tutor(&mut self, player: Seat, cost: i32) -> Option<CardInfo> {
        if self.players[player].hand.len() >= self.rules.hand_cap {
            return None;
        }
        let p = &mut self.players[player];
        let pos = p.deck.iter().rposition(|c| c.info().cost == cost)?;
        let card = p.deck.remove(pos);
        let info = card.info().clone();
        p.hand.push(card);
        p.drawn += 1;
        let landing = p.hand.len() - 1;
        self.announce(
            player,
            self.animation(Zone::Deck)
                .to(Zone::Hand)
                .card(info.clone())
                .landing(landing),
        );
        Some(info)
    }

    /// Returns the pile card at `index` to hand, if there is room.
    pub fn pile_to_hand(&mut self, player: Seat, index: usize) -> bool {
        if self.players[player].hand.len() >= self.rules.hand_cap {
            return false;
        }
        let p = &mut self.players[player];
        if index >= p.pile.len() {
            return false;
        }
        let card = p.pile.remove(index);
        let info = card.info().clone();
        p.hand.push(card);
        let landing = p.hand.len() - 1;
        self.announce(
            player,
            self.animation(Zone::Pile)
                .to(Zone::Hand)
                .card(info)
                .at(index)
                .landing(landing),
        );
        true
    }

    /// Puts the top card of the pile on top of the deck.
    pub fn pile_top_to_deck(&mut self, player: Seat) -> bool {
        let p = &mut self.players[player];
        let Some(card) = p.pile.pop() else {
            return false;
        };
        let info = card.info().clone();
        p.deck.push(card);
        self.announce(player, self.animation(Zone::Pile).to(Zone::Deck).card(info));
        true
    }

    /// Swaps the hand card at `index` for `card`, returning the old one.
    ///
    /// The replaced card leaves the game; this is how a card in hand is
    /// "changed", since cards themselves never mutate.
    pub fn replace_in_hand(&mut self, player: Seat, index: usize, card: CardRef) -> Option<CardRef> {
        let slot = self.players[player].hand.get_mut(index)?;
        let info = card.info().clone();
        let old = std::mem::replace(slot, card);
        self.announce(
            player,
            self.animation(Zone::Transform)
                .to(Zone::Hand)
                .card(info)
                .landing(index),
        );
        Some(old)
    }

    /// Removes the act at `index` from the story into its owner's pile.
    pub fn remove_act_to_pile(&mut self, index: usize) -> Result<()> {
        let act = self.story.remove_act(index)?;
        let info = act.card.info().clone();
        let p = &mut self.players[act.owner];
        p.pile.push(act.card);
        let landing = p.pile.len() - 1;
        self.announce(
            act.owner,
            self.animation(Zone::Story)
                .to(Zone::Pile)
                .card(info)
                .at(index)
                .landing(landing),
        );
        Ok(())
    }

    /// Returns the act at `index` to its owner's hand, or to the pile if
    /// the hand is full. Returns `true` if it reached the hand.
    pub fn return_act_to_hand(&mut self, index: usize) -> Result<bool> {
        let owner = self
            .story
            .get(index)
            .map(|a| a.owner)
            .ok_or(EngineError::ActOutOfRange {
                index,
                len: self.story.len(),
            })?;
        if self.players[owner].hand.len() >= self.rules.hand_cap {
            self.remove_act_to_pile(index)?;
            return Ok(false);
        }
        let act = self.story.remove_act(index)?;
        let info = act.card.info().clone();
        let p = &mut self.players[owner];
        p.hand.push(act.card);
        let landing = p.hand.len() - 1;
        self.announce(
            owner,
            self.animation(Zone::Story)
                .to(Zone::Hand)
                .card(info)
                .at(index)
                .landing(landing),
        );
        Ok(true)
    }

    /// Mutable access to the story for queue effects (counter, move,
    /// remove, replace).
    pub fn story_mut(&mut self) -> &mut Story {
        &mut self.story
    }

    // ----- Engine internals -----

    pub(crate) fn player_mut(&mut self, seat: Seat) -> &mut PlayerState {
        &mut self.players[seat]
    }

    /// Starts an announcement stamped with the current version.
    pub(crate) fn animation(&self, from: Zone) -> Animation {
        Animation::from_zone(self.version, from)
    }

    pub(crate) fn announce(&mut self, player: Seat, animation: Animation) {
        self.players[player].animations.push(animation);
    }

    /// Removes the hand card at `index` on its way into the story.
    pub(crate) fn take_from_hand(&mut self, player: Seat, index: usize) -> Option<CardRef> {
        let p = &mut self.players[player];
        if index >= p.hand.len() {
            return None;
        }
        let card = p.hand.remove(index);
        let info = card.info().clone();
        let landing = self.story.len();
        self.announce(
            player,
            self.animation(Zone::Hand)
                .to(Zone::Story)
                .card(info)
                .at(index)
                .landing(landing),
        );
        Some(card)
    }

    pub(crate) fn spend_mana(&mut self, player: Seat, amount: i32) {
        let p = &mut self.players[player];
        p.mana = (p.mana - amount).max(0);
    }

    /// Moves a resolved card out of the story: fleeting cards to the
    /// expended set, everything else to the pile.
    pub(crate) fn retire(&mut self, owner: Seat, card: CardRef, story_index: usize) {
        let info = card.info().clone();
        let fleeting = info.is_fleeting();
        let p = &mut self.players[owner];
        let (zone, landing) = if fleeting {
            p.expended.push(card);
            (Zone::Expended, p.expended.len() - 1)
        } else {
            p.pile.push(card);
            (Zone::Pile, p.pile.len() - 1)
        };
        self.announce(
            owner,
            self.animation(Zone::Story)
                .to(zone)
                .card(info)
                .at(story_index)
                .landing(landing),
        );
    }

    pub(crate) fn record_snapshot(&mut self) {
        let snapshot = PerSeat::from_fn(|seat| view::snapshot(self, seat));
        self.recap.push_snapshot(snapshot);
    }

    pub(crate) fn record_recap_line(&mut self, card: CardInfo, owner: Seat, result: String) {
        self.recap.push_entry(card, owner, result);
    }
}

/// Returns the first card in `cards` with the given name, with its index.
pub(crate) fn find_named<'a>(cards: &'a [CardRef], name: &str) -> Option<(usize, &'a CardRef)> {
    cards.iter().enumerate().find(|(_, c)| c.info().name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vanilla;
    use celestial_protocol::Quality;

    fn deck(n: usize, cost: i32) -> Vec<CardRef> {
        (0..n)
            .map(|i| Vanilla::card(CardInfo::new(i as u32, format!("Card{i}"), cost, 1)))
            .collect()
    }

    fn state_with(first: Vec<CardRef>, second: Vec<CardRef>) -> GameState {
        GameState::new([first, second], Rules::default(), Some(7)).unwrap()
    }

    // =====================================================================
    // draw
    // =====================================================================

    #[test]
    fn test_draw_takes_from_top_of_deck() {
        let mut state = state_with(deck(3, 1), deck(3, 1));
        assert_eq!(state.draw(Seat::First, 1), 1);
        assert_eq!(state.player(Seat::First).hand()[0].info().name, "Card2");
        assert_eq!(state.player(Seat::First).deck().len(), 2);
        assert_eq!(state.player(Seat::First).drawn(), 1);
    }

    #[test]
    fn test_draw_stops_at_hand_cap() {
        let mut state = state_with(deck(10, 1), deck(1, 1));
        assert_eq!(state.draw(Seat::First, 9), 6);
        assert_eq!(state.player(Seat::First).hand().len(), 6);
        assert_eq!(state.player(Seat::First).deck().len(), 4);
    }

    #[test]
    fn test_draw_from_empty_deck_is_a_noop() {
        let mut state = state_with(deck(1, 1), Vec::new());
        assert_eq!(state.draw(Seat::Second, 2), 0);
        assert!(state.player(Seat::Second).hand().is_empty());
    }

    #[test]
    fn test_draw_announces_each_card() {
        let mut state = state_with(deck(2, 1), deck(2, 1));
        state.draw(Seat::First, 2);
        let anims = state.player(Seat::First).animations();
        assert_eq!(anims.len(), 2);
        assert!(anims.iter().all(|a| a.from == Zone::Deck && a.to == Some(Zone::Hand)));
        assert!(state.player(Seat::Second).animations().is_empty());
    }

    // =====================================================================
    // Creation and conservation
    // =====================================================================

    #[test]
    fn test_create_card_counts_creations() {
        let mut state = state_with(deck(2, 1), deck(2, 1));
        let token = Vanilla::card(CardInfo::new(1003, "Child", 0, 1));
        assert!(state.create_card(Seat::First, token));
        let p = state.player(Seat::First);
        assert_eq!(p.created(), 1);
        assert_eq!(p.card_count(), p.starting_deck_size() + p.created());
    }

    #[test]
    fn test_create_card_refused_when_hand_full() {
        let mut state = state_with(deck(8, 1), deck(1, 1));
        state.draw(Seat::First, 6);
        let token = Vanilla::card(CardInfo::new(1003, "Child", 0, 1));
        assert!(!state.create_card(Seat::First, token));
        assert_eq!(state.player(Seat::First).created(), 0);
    }

    #[test]
    fn test_zone_moves_preserve_card_count() {
        let mut state = state_with(deck(8, 1), deck(1, 1));
        state.draw(Seat::First, 3);
        state.discard(Seat::First, 1);
        state.mill(Seat::First, 2);
        state.dig(Seat::First, 1);
        state.bottom(Seat::First, 0);
        state.pile_top_to_deck(Seat::First);
        let p = state.player(Seat::First);
        assert_eq!(p.card_count(), 8);
        assert_eq!(p.expended().len(), 1);
    }

    // =====================================================================
    // Costs and legality
    // =====================================================================

    #[test]
    fn test_unlocked_makes_everything_free() {
        let mut state = state_with(deck(2, 5), deck(1, 1));
        state.draw(Seat::First, 1);
        assert_eq!(state.cost_of(Seat::First, 0), Some(5));
        state.add_status(Seat::First, Status::Unlocked, 1);
        assert_eq!(state.cost_of(Seat::First, 0), Some(0));
    }

    #[test]
    fn test_check_play_reports_each_reason() {
        let mut state = state_with(deck(3, 2), deck(1, 1));
        state.draw(Seat::First, 2);

        assert_eq!(
            state.check_play(Seat::First, 4),
            Err(Rejection::HandIndex { index: 4, len: 2 })
        );
        assert_eq!(
            state.check_play(Seat::First, 0),
            Err(Rejection::InsufficientMana { cost: 2, mana: 0 })
        );

        state.player_mut(Seat::First).max_mana = 3;
        state.player_mut(Seat::First).mana = 3;
        assert_eq!(state.check_play(Seat::First, 0), Ok(2));

        state.add_status(Seat::First, Status::Restricted, 1);
        assert_eq!(
            state.check_play(Seat::First, 0),
            Err(Rejection::Restricted { index: 0 })
        );
        assert_eq!(state.check_play(Seat::First, 1), Ok(2));
    }

    #[test]
    fn test_vision_window_and_visible_acts() {
        let mut state = state_with(deck(1, 1), deck(1, 1));
        let hidden = Vanilla::card(CardInfo::new(1, "Hidden", 0, 1));
        let shown =
            Vanilla::card(CardInfo::new(2, "Shown", 0, 1).with_quality(Quality::Visible));
        let mine = Vanilla::card(CardInfo::new(3, "Mine", 0, 1));
        state.story_mut().add_act(hidden.clone(), Seat::Second, Provenance::Hand, None);
        state.story_mut().add_act(mine, Seat::First, Provenance::Hand, None);
        state.story_mut().add_act(hidden, Seat::Second, Provenance::Hand, None);
        state.story_mut().add_act(shown, Seat::Second, Provenance::Hand, None);

        assert!(!state.can_see_act(Seat::First, 0));
        assert!(state.can_see_act(Seat::First, 1));
        assert!(state.can_see_act(Seat::First, 3));
        assert_eq!(state.seen_acts(Seat::First), 1);

        state.sight(Seat::First, 3);
        assert_eq!(state.seen_acts(Seat::First), 3);
    }

    // =====================================================================
    // Mana
    // =====================================================================

    #[test]
    fn test_gain_mana_never_exceeds_max() {
        let mut state = state_with(deck(1, 1), deck(1, 1));
        state.player_mut(Seat::First).max_mana = 4;
        state.player_mut(Seat::First).mana = 3;
        state.gain_mana(Seat::First, 5);
        assert_eq!(state.player(Seat::First).mana(), 4);
    }

    #[test]
    fn test_exhale_only_when_affordable() {
        let mut state = state_with(deck(1, 1), deck(1, 1));
        state.player_mut(Seat::First).max_mana = 3;
        state.player_mut(Seat::First).mana = 3;
        assert!(state.exhale(Seat::First, 2));
        assert!(!state.exhale(Seat::First, 2));
        assert_eq!(state.player(Seat::First).mana(), 1);
    }

    // =====================================================================
    // Story helpers
    // =====================================================================

    #[test]
    fn test_remove_act_to_pile_out_of_range() {
        let mut state = state_with(deck(1, 1), deck(1, 1));
        assert!(matches!(
            state.remove_act_to_pile(0),
            Err(EngineError::ActOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_return_act_to_hand() {
        let mut state = state_with(deck(1, 1), deck(1, 1));
        let card = Vanilla::card(CardInfo::new(1, "Back", 0, 1));
        state.story_mut().add_act(card, Seat::Second, Provenance::Hand, None);
        assert!(state.return_act_to_hand(0).unwrap());
        assert!(state.story().is_empty());
        assert_eq!(state.player(Seat::Second).hand()[0].info().name, "Back");
    }

    #[test]
    fn test_seeded_states_shuffle_identically() {
        let mut a = state_with(deck(10, 1), deck(1, 1));
        let mut b = state_with(deck(10, 1), deck(1, 1));
        a.shuffle(Seat::First);
        b.shuffle(Seat::First);
        let names = |s: &GameState| -> Vec<String> {
            s.player(Seat::First)
                .deck()
                .iter()
                .map(|c| c.info().name.clone())
                .collect()
        };
        assert_eq!(names(&a), names(&b));
        assert_eq!(a.priority(), b.priority());
    }

    #[test]
    fn test_min_deck_size_enforced() {
        let rules = Rules {
            min_deck_size: 5,
            ..Rules::default()
        };
        let err = GameState::new([deck(5, 1), deck(4, 1)], rules, Some(1)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::DeckTooSmall {
                seat: Seat::Second,
                size: 4,
                min: 5
            }
        ));
    }
}
