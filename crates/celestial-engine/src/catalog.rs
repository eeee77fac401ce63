//! The reference card catalog.
//!
//! Each card is a constructor returning a fresh [`CardRef`]. Most cards
//! score normally and then do one thing, so they share [`Resolving`];
//! cards that hook other moments of the round get their own type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use celestial_protocol::{CardId, CardInfo, Quality, Seat, Status};

use crate::card::{award_points, pending_points};
use crate::state::find_named;
use crate::{Card, CardRef, EngineError, GameState, Result, Vanilla};

pub const CHILD: &str = "Child";

type Effect = fn(Seat, &mut GameState) -> Result<()>;
type Trigger = fn(Seat, &mut GameState);

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Maps card ids to constructors.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    cards: HashMap<CardId, fn() -> CardRef>,
}

const STANDARD: &[fn() -> CardRef] = &[
    dove,
    nascence,
    birth_card,
    impulse,
    dash,
    fruit,
    oak,
    bounty,
    pet_card,
    hollow,
    hold_tight,
    firebug,
    goliath,
    hungry_ghost,
    hurricane,
    sickness,
    vulture,
    from_ashes,
    dawn,
    nectar,
    clear_view,
    awakening,
    enlightenment,
    conquer,
    night_vision,
    timid,
    nest,
    truth,
    gust,
    fatigue,
    roost,
    open_sky,
    sprout,
    hush,
    kindling,
    patience,
    seen,
    ashes,
];

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every reference card.
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for make in STANDARD {
            catalog.register(*make);
        }
        catalog
    }

    /// Adds a constructor, keyed by the id of the card it builds.
    pub fn register(&mut self, make: fn() -> CardRef) {
        let id = make().info().id;
        self.cards.insert(id, make);
    }

    pub fn get(&self, id: CardId) -> Option<CardRef> {
        self.cards.get(&id).map(|make| make())
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Resolves a deck list, top card last.
    pub fn deck(&self, ids: &[CardId]) -> Result<Vec<CardRef>> {
        ids.iter()
            .map(|id| self.get(*id).ok_or(EngineError::UnknownCard(*id)))
            .collect()
    }

    /// All registered ids, ascending.
    pub fn ids(&self) -> Vec<CardId> {
        let mut ids: Vec<CardId> = self.cards.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Shared effects
// ---------------------------------------------------------------------------

/// Birth: grows the first Child in hand by `amount`, or creates one.
///
/// A grown Child is a new card swapped into the same slot, so the recap
/// never shows a value before it was reached.
pub fn birth(state: &mut GameState, player: Seat, amount: i32) {
    let existing = find_named(state.player(player).hand(), CHILD).map(|(i, c)| (i, c.info().points));
    match existing {
        Some((index, points)) => {
            state.replace_in_hand(player, index, child(points + amount));
        }
        None => {
            state.create_card(player, child(amount));
        }
    }
}

fn nourish(state: &mut GameState, player: Seat, amount: usize) {
    state.add_status(player, Status::Nourish, amount);
}

/// Acts in the story that `player` can currently see, their own included.
fn visible_acts(state: &GameState, player: Seat) -> usize {
    state.story().count_owned_by(player) + state.seen_acts(player)
}

// ---------------------------------------------------------------------------
// Resolving: score, then one effect
// ---------------------------------------------------------------------------

/// Scores its points, then runs `effect`. `sight` and `played` fire
/// when the card leaves hand.
struct Resolving {
    info: CardInfo,
    sight: u32,
    played: Option<Trigger>,
    effect: Option<Effect>,
}

impl Resolving {
    fn new(info: CardInfo) -> Self {
        Self {
            info,
            sight: 0,
            played: None,
            effect: None,
        }
    }

    fn sight(mut self, amount: u32) -> Self {
        self.sight = amount;
        self
    }

    fn played(mut self, trigger: Trigger) -> Self {
        self.played = Some(trigger);
        self
    }

    fn then(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    fn card(self) -> CardRef {
        Arc::new(self)
    }
}

impl fmt::Debug for Resolving {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolving")
            .field("info", &self.info)
            .field("sight", &self.sight)
            .finish_non_exhaustive()
    }
}

impl Card for Resolving {
    fn info(&self) -> &CardInfo {
        &self.info
    }

    fn on_play(&self, player: Seat, state: &mut GameState) -> Option<CardRef> {
        if self.sight > 0 {
            state.sight(player, self.sight);
        }
        if let Some(trigger) = self.played {
            trigger(player, state);
        }
        None
    }

    fn play(&self, player: Seat, state: &mut GameState, _index: usize, bonus: i32) -> Result<String> {
        let result = award_points(&self.info, player, state, bonus);
        if let Some(effect) = self.effect {
            effect(player, state)?;
        }
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn child(points: i32) -> CardRef {
    Vanilla::card(
        CardInfo::new(1003, CHILD, 0, points)
            .with_quality(Quality::Fleeting)
            .with_text("Fleeting"),
    )
}

/// Gives the opponent Sight 3 at each upkeep while in hand.
#[derive(Debug)]
struct Seen {
    info: CardInfo,
}

impl Card for Seen {
    fn info(&self) -> &CardInfo {
        &self.info
    }

    fn on_upkeep(&self, player: Seat, state: &mut GameState, _index: usize) -> bool {
        state.sight(player.other(), 3);
        true
    }
}

pub fn seen() -> CardRef {
    Arc::new(Seen {
        info: CardInfo::new(1001, "Seen", 2, 0)
            .with_quality(Quality::Fleeting)
            .with_text("Fleeting\nAt the start of each round, if this is in your hand, give your opponent Sight 3."),
    })
}

pub fn ashes() -> CardRef {
    Resolving::new(
        CardInfo::new(1002, "Ashes", 1, 0)
            .with_quality(Quality::Fleeting)
            .with_text("Fleeting\nDraw a card."),
    )
    .then(|player, state| {
        state.draw(player, 1);
        Ok(())
    })
    .card()
}

pub fn dove() -> CardRef {
    Vanilla::card(
        CardInfo::new(4, "Dove", 1, 1)
            .with_quality(Quality::Visible)
            .with_quality(Quality::Fleeting)
            .with_text("Visible\nFleeting"),
    )
}

// ---------------------------------------------------------------------------
// Birth
// ---------------------------------------------------------------------------

pub fn nascence() -> CardRef {
    Resolving::new(CardInfo::new(2, "Nascence", 0, 0).with_text("Birth 1"))
        .then(|player, state| {
            birth(state, player, 1);
            Ok(())
        })
        .card()
}

pub fn birth_card() -> CardRef {
    Resolving::new(CardInfo::new(8, "Birth", 2, 0).with_text("Birth 2"))
        .then(|player, state| {
            birth(state, player, 2);
            Ok(())
        })
        .card()
}

// ---------------------------------------------------------------------------
// Ashes
// ---------------------------------------------------------------------------

/// Worth 1 less for each act that resolved before it.
#[derive(Debug)]
struct Dash {
    info: CardInfo,
}

impl Card for Dash {
    fn info(&self) -> &CardInfo {
        &self.info
    }

    fn play(&self, player: Seat, state: &mut GameState, index: usize, bonus: i32) -> Result<String> {
        let bonus = bonus - index as i32;
        Ok(award_points(&self.info, player, state, bonus))
    }
}

pub fn dash() -> CardRef {
    Arc::new(Dash {
        info: CardInfo::new(6, "Dash", 2, 3)
            .with_text("Worth -1 for each card before this in the story."),
    })
}

pub fn impulse() -> CardRef {
    Resolving::new(
        CardInfo::new(3, "Impulse", 1, 1)
            .with_quality(Quality::Fleeting)
            .with_text("Fleeting\nCreate two Ashes in your discard pile."),
    )
    .then(|player, state| {
        for _ in 0..2 {
            state.create_in_pile(player, ashes());
        }
        Ok(())
    })
    .card()
}

pub fn firebug() -> CardRef {
    Resolving::new(CardInfo::new(41, "Firebug", 0, 1).with_text("Discard a card."))
        .then(|player, state| {
            state.discard(player, 1);
            Ok(())
        })
        .card()
}

pub fn goliath() -> CardRef {
    Resolving::new(
        CardInfo::new(38, "Goliath", 8, 8)
            .with_text("Discard the next card in the story and the top 2 cards of your deck."),
    )
    .then(|player, state| {
        if !state.story().is_empty() {
            state.remove_act_to_pile(0)?;
        }
        state.mill(player, 2);
        Ok(())
    })
    .card()
}

pub fn from_ashes() -> CardRef {
    Resolving::new(CardInfo::new(74, "From Ashes", 2, 1).with_text(
        "Remove from the game the top three cards of your discard pile. \
         Nourish 1 for each card with Fleeting removed.",
    ))
    .then(|player, state| {
        let pile = state.player(player).pile();
        let fleeting = pile
            .iter()
            .rev()
            .take(3)
            .filter(|c| c.info().is_fleeting())
            .count();
        state.dig(player, 3);
        nourish(state, player, fleeting);
        Ok(())
    })
    .card()
}

// ---------------------------------------------------------------------------
// Growth
// ---------------------------------------------------------------------------

pub fn fruit() -> CardRef {
    Resolving::new(CardInfo::new(11, "Fruit", 3, 0).with_text("Nourish 3"))
        .then(|player, state| {
            nourish(state, player, 3);
            Ok(())
        })
        .card()
}

/// Nourishes by the winning margin once the round's story has drained.
#[derive(Debug)]
struct Oak {
    info: CardInfo,
}

impl Card for Oak {
    fn info(&self) -> &CardInfo {
        &self.info
    }

    fn on_round_end(&self, player: Seat, state: &mut GameState) {
        let margin = state.player(player).score() - state.player(player.other()).score();
        if margin > 0 {
            nourish(state, player, margin as usize);
        }
    }
}

pub fn oak() -> CardRef {
    Arc::new(Oak {
        info: CardInfo::new(23, "Oak", 8, 8)
            .with_text("If you win this round, Nourish 1 for each point you won by."),
    })
}

pub fn bounty() -> CardRef {
    Resolving::new(CardInfo::new(48, "Bounty", 3, 3).with_text("Both players Nourish 2."))
        .then(|_, state| {
            for seat in Seat::BOTH {
                nourish(state, seat, 2);
            }
            Ok(())
        })
        .card()
}

/// Leaves a copy in the pile that keeps whatever it scored.
#[derive(Debug)]
struct Pet {
    info: CardInfo,
}

impl Card for Pet {
    fn info(&self) -> &CardInfo {
        &self.info
    }

    fn play(&self, player: Seat, state: &mut GameState, _index: usize, bonus: i32) -> Result<String> {
        let points = pending_points(&self.info, player, state, bonus);
        state.create_in_pile(player, pet(points));
        Ok(award_points(&self.info, player, state, bonus))
    }
}

pub fn pet(points: i32) -> CardRef {
    Arc::new(Pet {
        info: CardInfo::new(34, "Pet", 2, points)
            .with_quality(Quality::Fleeting)
            .with_text("Fleeting\nThis permanently retains all changes to its points."),
    })
}

pub fn pet_card() -> CardRef {
    pet(1)
}

pub fn hollow() -> CardRef {
    Resolving::new(
        CardInfo::new(76, "Hollow", 0, 0)
            .with_text("Set your points to 0. Nourish 1 for each point you lost this way."),
    )
    .then(|player, state| {
        let lost = state.reset_score(player).max(0);
        nourish(state, player, lost as usize);
        Ok(())
    })
    .card()
}

pub fn hold_tight() -> CardRef {
    Resolving::new(
        CardInfo::new(33, "Hold Tight", 2, 2)
            .with_text("Put the top card of your discard pile on top of your deck."),
    )
    .then(|player, state| {
        state.pile_top_to_deck(player);
        Ok(())
    })
    .card()
}

// ---------------------------------------------------------------------------
// Hunger
// ---------------------------------------------------------------------------

pub fn hungry_ghost() -> CardRef {
    Resolving::new(CardInfo::new(31, "Hungry Ghost", 2, 4).with_text("Starve 4"))
        .then(|player, state| {
            state.add_status(player, Status::Starve, 4);
            Ok(())
        })
        .card()
}

pub fn hurricane() -> CardRef {
    Resolving::new(CardInfo::new(13, "Hurricane", 4, 0).with_text("Set both players' points to 0."))
        .then(|_, state| {
            for seat in Seat::BOTH {
                state.reset_score(seat);
            }
            Ok(())
        })
        .card()
}

pub fn sickness() -> CardRef {
    Resolving::new(
        CardInfo::new(58, "Sickness", 3, -1)
            .with_quality(Quality::Fleeting)
            .with_text("Fleeting\nYour opponent Starves 4. Create a Sickness in their hand."),
    )
    .then(|player, state| {
        let opponent = player.other();
        state.add_status(opponent, Status::Starve, 4);
        state.create_card(opponent, sickness());
        Ok(())
    })
    .card()
}

pub fn vulture() -> CardRef {
    Resolving::new(
        CardInfo::new(64, "Vulture", 3, 5)
            .with_quality(Quality::Visible)
            .with_quality(Quality::Fleeting)
            .with_text("Visible\nFleeting\nWhen played, Starve 2."),
    )
    .played(|player, state| state.add_status(player, Status::Starve, 2))
    .card()
}

// ---------------------------------------------------------------------------
// Vision
// ---------------------------------------------------------------------------

/// Returns to hand from the top of the pile each morning.
#[derive(Debug)]
struct Dawn {
    info: CardInfo,
}

impl Card for Dawn {
    fn info(&self) -> &CardInfo {
        &self.info
    }

    fn on_play(&self, player: Seat, state: &mut GameState) -> Option<CardRef> {
        state.sight(player, 4);
        None
    }

    fn morning(&self, player: Seat, state: &mut GameState, index: usize) -> bool {
        state.pile_to_hand(player, index)
    }
}

pub fn dawn() -> CardRef {
    Arc::new(Dawn {
        info: CardInfo::new(50, "Dawn", 0, 0)
            .with_text("When played, gain Sight 4.\nMorning: Return this to hand."),
    })
}

pub fn nectar() -> CardRef {
    Resolving::new(
        CardInfo::new(25, "Nectar", 1, 0).with_text("Nourish 1\nWhen played, gain Sight 3."),
    )
    .sight(3)
    .then(|player, state| {
        nourish(state, player, 1);
        Ok(())
    })
    .card()
}

pub fn clear_view() -> CardRef {
    Resolving::new(
        CardInfo::new(27, "Clear View", 1, 0).with_text("Create a Seen in your opponent's hand."),
    )
    .then(|player, state| {
        state.create_card(player.other(), seen());
        Ok(())
    })
    .card()
}

pub fn awakening() -> CardRef {
    Resolving::new(
        CardInfo::new(39, "Awakening", 3, 3)
            .with_text("When played, gain Sight 5. Your sight no longer fades."),
    )
    .sight(5)
    .played(|player, state| state.add_status(player, Status::Awakened, 1))
    .card()
}

/// Costs nothing once three opponent acts are in view.
#[derive(Debug)]
struct Enlightenment {
    info: CardInfo,
}

impl Card for Enlightenment {
    fn info(&self) -> &CardInfo {
        &self.info
    }

    fn cost(&self, player: Seat, state: &GameState) -> i32 {
        if state.seen_acts(player) >= 3 {
            0
        } else {
            self.info.cost
        }
    }
}

pub fn enlightenment() -> CardRef {
    Arc::new(Enlightenment {
        info: CardInfo::new(45, "Enlightenment", 7, 7).with_text(
            "Costs 0 if you can see at least three of your opponent's cards in the story.",
        ),
    })
}

#[derive(Debug)]
struct Conquer {
    info: CardInfo,
}

impl Card for Conquer {
    fn info(&self) -> &CardInfo {
        &self.info
    }

    fn cost(&self, player: Seat, state: &GameState) -> i32 {
        (self.info.cost - visible_acts(state, player) as i32).max(0)
    }
}

pub fn conquer() -> CardRef {
    Arc::new(Conquer {
        info: CardInfo::new(67, "Conquer", 5, 3)
            .with_text("Costs 1 less for each card you can see in the story."),
    })
}

pub fn night_vision() -> CardRef {
    Resolving::new(CardInfo::new(28, "Night Vision", 1, 0).with_text(
        "Put the top card with base cost 2 from your deck into your hand.\n\
         When played, gain Sight 3.",
    ))
    .sight(3)
    .then(|player, state| {
        state.tutor(player, 2);
        Ok(())
    })
    .card()
}

pub fn timid() -> CardRef {
    Resolving::new(CardInfo::new(87, "Timid", 1, 1).with_text(
        "When played, gain Sight 3.\nExhale 1: Return your cards later in the story to your hand.",
    ))
    .sight(3)
    .then(|player, state| {
        if state.exhale(player, 1) {
            let mut i = 0;
            while i < state.story().len() {
                match state.story().get(i) {
                    Some(act) if act.owner == player => {
                        state.return_act_to_hand(i)?;
                    }
                    _ => i += 1,
                }
            }
        }
        Ok(())
    })
    .card()
}

// ---------------------------------------------------------------------------
// Birds
// ---------------------------------------------------------------------------

/// Adds a Dove to the story each morning while on top of the pile.
#[derive(Debug)]
struct Nest {
    info: CardInfo,
}

impl Card for Nest {
    fn info(&self) -> &CardInfo {
        &self.info
    }

    fn morning(&self, player: Seat, state: &mut GameState, _index: usize) -> bool {
        state.create_in_story(player, dove(), None);
        true
    }
}

pub fn nest() -> CardRef {
    Arc::new(Nest {
        info: CardInfo::new(60, "Nest", 2, 0).with_text("Morning: Create a Dove in the story."),
    })
}

pub fn truth() -> CardRef {
    Vanilla::card(CardInfo::new(61, "Truth", 6, 7))
}

pub fn roost() -> CardRef {
    Resolving::new(
        CardInfo::new(903, "Roost", 2, 1).with_text("Flock 1: Next upkeep, create a Dove in your hand."),
    )
    .then(|player, state| {
        state.add_status(player, Status::Flock, 1);
        Ok(())
    })
    .card()
}

// ---------------------------------------------------------------------------
// Pressure
// ---------------------------------------------------------------------------

pub fn gust() -> CardRef {
    Resolving::new(
        CardInfo::new(901, "Gust", 1, 1)
            .with_text("Next round, your opponent can't play their leftmost card."),
    )
    .then(|player, state| {
        state.add_status(player.other(), Status::Restrict, 1);
        Ok(())
    })
    .card()
}

pub fn fatigue() -> CardRef {
    Resolving::new(
        CardInfo::new(902, "Fatigue", 1, 1).with_text("Next round, your opponent has 1 less mana."),
    )
    .then(|player, state| {
        state.add_status(player.other(), Status::Dull, 1);
        Ok(())
    })
    .card()
}

pub fn open_sky() -> CardRef {
    Resolving::new(CardInfo::new(904, "Open Sky", 9, 3).with_text("Your cards cost 0."))
        .then(|player, state| {
            state.add_status(player, Status::Unlocked, 1);
            Ok(())
        })
        .card()
}

/// Counters the first opponent act already in the story.
pub fn hush() -> CardRef {
    Resolving::new(
        CardInfo::new(906, "Hush", 1, 0)
            .with_text("When played, counter your opponent's next card in the story."),
    )
    .played(|player, state| {
        state.story_mut().counter(|act| act.owner != player);
    })
    .card()
}

/// Springs into the story from the leftmost hand slot, worth 1 more.
#[derive(Debug)]
struct Sprout {
    info: CardInfo,
}

impl Card for Sprout {
    fn info(&self) -> &CardInfo {
        &self.info
    }

    fn springs(&self) -> bool {
        true
    }

    fn play_spring(&self, player: Seat, state: &mut GameState, index: usize, bonus: i32) -> Result<String> {
        self.play(player, state, index, bonus + 1)
    }
}

pub fn sprout() -> CardRef {
    Arc::new(Sprout {
        info: CardInfo::new(905, "Sprout", 1, 1)
            .with_text("Springs from the left of your hand, worth +1 when it does."),
    })
}

/// Nourishes its owner whenever they play another card.
#[derive(Debug)]
struct Kindling {
    info: CardInfo,
}

impl Card for Kindling {
    fn info(&self) -> &CardInfo {
        &self.info
    }

    fn in_hand_on_play(&self, player: Seat, state: &mut GameState) {
        nourish(state, player, 1);
    }
}

pub fn kindling() -> CardRef {
    Arc::new(Kindling {
        info: CardInfo::new(907, "Kindling", 2, 1)
            .with_text("While this is in your hand, each card you play gives you Nourish 1."),
    })
}

/// Playable only into an empty story.
#[derive(Debug)]
struct Patience {
    info: CardInfo,
}

impl Card for Patience {
    fn info(&self) -> &CardInfo {
        &self.info
    }

    fn can_play(&self, _player: Seat, state: &GameState) -> bool {
        state.story().is_empty()
    }
}

pub fn patience() -> CardRef {
    Arc::new(Patience {
        info: CardInfo::new(908, "Patience", 2, 4)
            .with_text("Can only be played while the story is empty."),
    })
}
