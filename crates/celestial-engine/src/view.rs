//! Projection of the game state into a single player's view.

use celestial_protocol::{
    ActView, Animation, CardInfo, ClientView, HandCard, OpponentView, Phase, Seat, Tally, Zone,
};

use crate::{CardRef, GameState};

/// Builds what `viewer` may see, with announcements newer than `since`.
///
/// Hidden information stays hidden: the opponent's hand and deck are
/// counts only, unseen opponent acts carry no card, and the opponent's
/// announcements only name cards that land in a public zone.
pub fn project(state: &GameState, viewer: Seat, since: u64) -> ClientView {
    let mut view = base_view(state, viewer, false);

    view.animations = Tally {
        me: state
            .player(viewer)
            .animations()
            .iter()
            .filter(|a| a.version > since)
            .cloned()
            .collect(),
        opponent: state
            .player(viewer.other())
            .animations()
            .iter()
            .filter(|a| a.version > since)
            .filter_map(redact)
            .collect(),
    };

    if !state.recap().is_empty() {
        view.recap = Some(Box::new(state.recap().view_for(viewer)));
    }

    view
}

/// A recap frame: every act revealed, no announcements, no nested recap.
pub(crate) fn snapshot(state: &GameState, viewer: Seat) -> ClientView {
    base_view(state, viewer, true)
}

fn base_view(state: &GameState, viewer: Seat, is_recap: bool) -> ClientView {
    let me = state.player(viewer);
    let them = state.player(viewer.other());
    let phase = state.phase();

    let hand = me
        .hand()
        .iter()
        .enumerate()
        .map(|(i, card)| HandCard {
            card: card.info().clone(),
            cost: state.card_cost(viewer, card),
            playable: phase == Phase::AwaitingInput(viewer) && state.can_play(viewer, i),
        })
        .collect();

    let mut deck = infos(me.deck());
    deck.sort_by(|a, b| a.cost.cmp(&b.cost).then_with(|| a.name.cmp(&b.name)));

    let story = state
        .story()
        .acts()
        .enumerate()
        .map(|(i, act)| {
            let mine = act.owner == viewer;
            let shown = is_recap || state.can_see_act(viewer, i);
            ActView {
                mine,
                card: shown.then(|| act.card.info().clone()),
                provenance: act.provenance,
                countered: act.countered,
            }
        })
        .collect();

    let per_player = |f: fn(&crate::PlayerState) -> u32| Tally {
        me: f(me),
        opponent: f(them),
    };

    ClientView {
        version: state.version(),
        seat: viewer,
        phase,
        has_priority: phase == Phase::AwaitingInput(viewer),
        round: state.round(),

        hand,
        deck,
        pile: infos(me.pile()),
        expended: infos(me.expended()),
        opponent: OpponentView {
            hand_size: them.hand().len(),
            deck_size: them.deck().len(),
            pile: infos(them.pile()),
            expended: infos(them.expended()),
            max_mana: them.max_mana(),
            mulligan_complete: them.mulligan_complete(),
        },
        story,

        mana: me.mana(),
        max_mana: me.max_mana(),
        vision: me.vision(),
        statuses: me.status().counts(),
        mulligan_complete: me.mulligan_complete(),

        score: Tally {
            me: me.score(),
            opponent: them.score(),
        },
        wins: per_player(|p| p.wins()),
        passes: per_player(|p| p.passes()),
        round_results: Tally {
            me: me.round_results().to_vec(),
            opponent: them.round_results().to_vec(),
        },
        winner: state.winner(),

        animations: Tally::default(),
        recap: None,
        is_recap,
        outcome: None,
    }
}

fn infos(cards: &[CardRef]) -> Vec<CardInfo> {
    cards.iter().map(|c| c.info().clone()).collect()
}

/// The opponent's copy of an announcement. Mulligans are not shown at
/// all; other moves only name the card when it lands in a public zone.
fn redact(animation: &Animation) -> Option<Animation> {
    if animation.to == Some(Zone::Mulligan) {
        return None;
    }
    let public = matches!(animation.to, Some(Zone::Pile | Zone::Expended));
    let mut out = animation.clone();
    if !public {
        out.card = None;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rules, Vanilla};
    use celestial_protocol::Provenance;

    fn deck(n: usize) -> Vec<CardRef> {
        (0..n)
            .map(|i| Vanilla::card(CardInfo::new(i as u32, format!("Card{i}"), (i % 3) as i32, 1)))
            .collect()
    }

    fn state() -> GameState {
        GameState::new([deck(6), deck(6)], Rules::default(), Some(3)).unwrap()
    }

    #[test]
    fn test_opponent_hand_is_a_count() {
        let mut state = state();
        state.draw(Seat::Second, 2);
        let view = project(&state, Seat::First, 0);
        assert_eq!(view.opponent.hand_size, 2);
        assert_eq!(view.opponent.deck_size, 4);
        assert!(view.hand.is_empty());
    }

    #[test]
    fn test_deck_is_sorted() {
        let view = project(&state(), Seat::First, 0);
        let costs: Vec<i32> = view.deck.iter().map(|c| c.cost).collect();
        let mut sorted = costs.clone();
        sorted.sort();
        assert_eq!(costs, sorted);
    }

    #[test]
    fn test_unseen_opponent_acts_hide_their_card() {
        let mut state = state();
        let card = Vanilla::card(CardInfo::new(50, "Secret", 0, 1));
        state
            .story_mut()
            .add_act(card, Seat::Second, Provenance::Hand, None);

        let mine = project(&state, Seat::Second, 0);
        assert!(mine.story[0].card.is_some());
        assert!(mine.story[0].mine);

        let theirs = project(&state, Seat::First, 0);
        assert!(theirs.story[0].card.is_none());
        assert!(!theirs.story[0].mine);

        let frame = snapshot(&state, Seat::First);
        assert!(frame.is_recap);
        assert!(frame.story[0].card.is_some());
    }

    #[test]
    fn test_animations_filtered_by_version_and_redacted() {
        let mut state = state();
        state.version_increment();
        state.draw(Seat::First, 1);
        state.version_increment();
        state.mill(Seat::First, 1);

        let own = project(&state, Seat::First, 1);
        assert_eq!(own.animations.me.len(), 1);
        assert_eq!(own.animations.me[0].to, Some(Zone::Pile));

        let other = project(&state, Seat::Second, 0);
        assert_eq!(other.animations.opponent.len(), 2);
        assert!(other.animations.opponent[0].card.is_none());
        assert!(other.animations.opponent[1].card.is_some());
    }
}
