//! Integration tests for whole rounds and matches.

use celestial_engine::{
    COUNTERED, Card, CardRef, Catalog, GameState, Rejection, Result, Rules, TurnController, Vanilla,
    award_points, cards,
};
use celestial_protocol::{Action, CardId, CardInfo, Phase, Provenance, Seat, Status};

// =========================================================================
// Helpers
// =========================================================================

const SEED: u64 = 17;

fn vanilla_deck(n: usize, cost: i32, points: i32) -> Vec<CardRef> {
    (0..n)
        .map(|i| Vanilla::card(CardInfo::new(500 + i as u32, format!("V{points}-{i}"), cost, points)))
        .collect()
}

fn game(first: Vec<CardRef>, second: Vec<CardRef>, rules: Rules) -> TurnController {
    TurnController::new([first, second], rules, Some(SEED)).unwrap()
}

fn keep_all(c: &mut TurnController) {
    for seat in Seat::BOTH {
        let n = c.state().player(seat).hand().len();
        c.apply_action(seat, Action::Mulligan { mask: vec![false; n] }, None)
            .unwrap();
    }
}

fn hand_names(state: &GameState, seat: Seat) -> Vec<String> {
    state
        .player(seat)
        .hand()
        .iter()
        .map(|c| c.info().name.clone())
        .collect()
}

/// Priority player, then the other player, each play their leftmost card;
/// then both pass.
fn play_round(c: &mut TurnController) {
    let first = c.state().priority();
    c.apply_action(first, Action::Play { index: 0 }, None).unwrap();
    c.apply_action(first.other(), Action::Play { index: 0 }, None)
        .unwrap();
    c.apply_action(first, Action::Pass, None).unwrap();
    c.apply_action(first.other(), Action::Pass, None).unwrap();
}

/// Both players pass, priority first, settling the round.
fn end_round(c: &mut TurnController) {
    let priority = c.state().priority();
    c.apply_action(priority, Action::Pass, None).unwrap();
    c.apply_action(priority.other(), Action::Pass, None).unwrap();
}

/// Hands priority to `seat` with a single pass if the other player has it.
fn give_priority(c: &mut TurnController, seat: Seat) {
    if c.state().priority() != seat {
        c.apply_action(seat.other(), Action::Pass, None).unwrap();
    }
}

fn check_invariants(state: &GameState) {
    let cap = state.rules().mana_cap;
    for seat in Seat::BOTH {
        let p = state.player(seat);
        assert!(0 <= p.mana(), "{seat} mana below zero");
        assert!(p.mana() <= p.max_mana(), "{seat} mana above max");
        assert!(p.max_mana() <= cap, "{seat} max mana above cap");

        let held = p.card_count() + state.story().count_owned_by(seat);
        assert_eq!(
            held,
            p.starting_deck_size() + p.created(),
            "{seat} card count drifted"
        );
    }
}

// =========================================================================
// Opening
// =========================================================================

#[test]
fn test_opening_scenario() {
    let mut c = game(vanilla_deck(14, 1, 1), vanilla_deck(14, 1, 1), Rules::default());
    let real = Rules::default().start_hand_real();

    for seat in Seat::BOTH {
        assert_eq!(c.state().player(seat).hand().len(), real);
    }

    let before = [
        hand_names(c.state(), Seat::First),
        hand_names(c.state(), Seat::Second),
    ];
    keep_all(&mut c);
    for seat in Seat::BOTH {
        assert_eq!(hand_names(c.state(), seat), before[seat.index()]);
        assert!(c.state().player(seat).mulligan_complete());
    }

    let priority = c.state().priority();
    c.apply_action(priority, Action::Pass, None).unwrap();
    assert_eq!(c.state().priority(), priority.other());
}

#[test]
fn test_mulligan_replaces_thrown_cards() {
    let mut c = game(vanilla_deck(14, 1, 1), vanilla_deck(14, 1, 1), Rules::default());
    c.apply_action(
        Seat::First,
        Action::Mulligan {
            mask: vec![true, false, true],
        },
        None,
    )
    .unwrap();
    let p = c.state().player(Seat::First);
    assert_eq!(p.hand().len(), 3);
    assert_eq!(p.deck().len(), 11);
    assert_eq!(c.phase(), Phase::Mulligan);
}

// =========================================================================
// Version
// =========================================================================

#[test]
fn test_version_increments_once_per_action() {
    let mut c = game(vanilla_deck(14, 1, 1), vanilla_deck(14, 1, 1), Rules::default());
    assert_eq!(c.version(), 1);
    keep_all(&mut c);
    assert_eq!(c.version(), 3);

    let priority = c.state().priority();
    c.apply_action(priority, Action::Pass, None).unwrap();
    assert_eq!(c.version(), 4);

    // Second pass: takedown and upkeep in one step.
    c.apply_action(priority.other(), Action::Pass, None).unwrap();
    assert_eq!(c.version(), 5);
    assert_eq!(c.state().round(), 1);

    let err = c
        .apply_action(c.state().priority().other(), Action::Pass, None)
        .unwrap_err();
    assert!(err.is_rejection());
    assert_eq!(c.version(), 5);
}

#[test]
fn test_stale_version_is_rejected_without_change() {
    let mut c = game(vanilla_deck(14, 1, 1), vanilla_deck(14, 1, 1), Rules::default());
    keep_all(&mut c);
    let priority = c.state().priority();
    let err = c
        .apply_action(priority, Action::Play { index: 0 }, Some(2))
        .unwrap_err();
    assert_eq!(
        err.rejection(),
        Some(&Rejection::StaleVersion {
            expected: 2,
            current: 3
        })
    );
    assert!(c.state().story().is_empty());

    c.apply_action(priority, Action::Play { index: 0 }, Some(3))
        .unwrap();
    assert_eq!(c.state().story().len(), 1);
}

// =========================================================================
// Passing
// =========================================================================

#[test]
fn test_double_pass_settles_and_refreshes() {
    let mut c = game(vanilla_deck(14, 1, 1), vanilla_deck(14, 1, 1), Rules::default());
    keep_all(&mut c);
    let priority = c.state().priority();
    c.apply_action(priority, Action::Pass, None).unwrap();
    c.apply_action(priority.other(), Action::Pass, None).unwrap();

    for seat in Seat::BOTH {
        let p = c.state().player(seat);
        assert_eq!(p.score(), 0);
        assert_eq!(p.hand().len(), 5);
        assert_eq!(p.max_mana(), 2);
        assert_eq!(p.mana(), 2);
        assert_eq!(p.round_results(), &[0]);
        assert_eq!(p.wins(), 0);
    }
    assert!(matches!(c.phase(), Phase::AwaitingInput(_)));
}

#[test]
fn test_pass_locked_at_full_mana_with_empty_story() {
    let rules = Rules {
        mana_cap: 1,
        ..Rules::default()
    };
    let mut c = game(vanilla_deck(14, 1, 1), vanilla_deck(14, 1, 1), rules);
    keep_all(&mut c);
    let priority = c.state().priority();

    let err = c.apply_action(priority, Action::Pass, None).unwrap_err();
    assert_eq!(err.rejection(), Some(&Rejection::PassLocked));

    c.apply_action(priority, Action::Play { index: 0 }, None)
        .unwrap();
    c.apply_action(priority.other(), Action::Pass, None).unwrap();
}

// =========================================================================
// Resolution
// =========================================================================

#[test]
fn test_story_resolves_in_order_with_counter() {
    let mut c = game(vanilla_deck(14, 1, 1), vanilla_deck(14, 1, 1), Rules::default());
    keep_all(&mut c);

    let named = |name: &str| Vanilla::card(CardInfo::new(900, name, 0, 1));
    let story = c.state_mut().story_mut();
    story.add_act(named("A"), Seat::First, Provenance::Hand, None);
    story.add_act(named("B"), Seat::Second, Provenance::Hand, None);
    story.add_act(named("C"), Seat::First, Provenance::Hand, None);
    story.counter(|act| act.card.info().name == "B");

    let priority = c.state().priority();
    c.apply_action(priority, Action::Pass, None).unwrap();
    c.apply_action(priority.other(), Action::Pass, None).unwrap();

    let recap = c.state().recap();
    let lines: Vec<(&str, &str)> = recap
        .entries()
        .iter()
        .map(|e| (e.card.name.as_str(), e.result.as_str()))
        .collect();
    assert_eq!(lines, vec![("A", "+1"), ("B", COUNTERED), ("C", "+1")]);
    assert_eq!(recap.scores()[Seat::First], 2);
    assert_eq!(recap.scores()[Seat::Second], 0);
    assert_eq!(c.state().player(Seat::First).wins(), 1);

    // One frame before the first act, one after each, and the final frame.
    assert_eq!(recap.snapshot_count(), 5);
    assert!(c.state().story().is_empty());
}

#[test]
fn test_round_scoring_awards_one_win_to_leader() {
    let mut c = game(vanilla_deck(14, 1, 3), vanilla_deck(14, 1, 2), Rules::default());
    keep_all(&mut c);
    play_round(&mut c);

    let first = c.state().player(Seat::First);
    let second = c.state().player(Seat::Second);
    assert_eq!(first.round_results(), &[3]);
    assert_eq!(second.round_results(), &[2]);
    assert_eq!(first.wins(), 1);
    assert_eq!(second.wins(), 0);
    assert_eq!(first.pile().len(), 1);
}

#[test]
fn test_tie_awards_nothing() {
    let mut c = game(vanilla_deck(14, 1, 2), vanilla_deck(14, 1, 2), Rules::default());
    keep_all(&mut c);
    play_round(&mut c);
    for seat in Seat::BOTH {
        assert_eq!(c.state().player(seat).wins(), 0);
    }
}

#[test]
fn test_match_ends_at_wins_to_win() {
    let rules = Rules {
        wins_to_win: 2,
        ..Rules::default()
    };
    let mut c = game(vanilla_deck(14, 1, 3), vanilla_deck(14, 1, 1), rules);
    keep_all(&mut c);

    play_round(&mut c);
    assert!(c.winner().is_none());
    play_round(&mut c);

    assert_eq!(c.winner(), Some(Seat::First));
    assert_eq!(c.phase(), Phase::GameOver);
    assert_eq!(c.state().round(), 2);

    let version = c.version();
    let err = c.apply_action(Seat::Second, Action::Pass, None).unwrap_err();
    assert_eq!(err.rejection(), Some(&Rejection::GameOver));
    assert_eq!(c.version(), version);
}

#[test]
fn test_springing_cards_enter_the_story() {
    let sprouts = || (0..14).map(|_| cards::sprout()).collect::<Vec<_>>();
    let mut c = game(sprouts(), sprouts(), Rules::default());
    keep_all(&mut c);
    let priority = c.state().priority();
    c.apply_action(priority, Action::Pass, None).unwrap();
    c.apply_action(priority.other(), Action::Pass, None).unwrap();

    let results: Vec<&str> = c
        .state()
        .recap()
        .entries()
        .iter()
        .map(|e| e.result.as_str())
        .collect();
    assert_eq!(results, vec!["+2", "+2"]);
    assert_eq!(c.state().recap().entries()[0].owner, priority);
}

// =========================================================================
// Upkeep statuses
// =========================================================================

#[test]
fn test_dull_and_restrict_apply_next_round() {
    let mut c = game(vanilla_deck(14, 1, 1), vanilla_deck(14, 1, 1), Rules::default());
    keep_all(&mut c);
    c.state_mut().add_status(Seat::First, Status::Dull, 1);
    c.state_mut().add_status(Seat::Second, Status::Restrict, 1);

    let priority = c.state().priority();
    c.apply_action(priority, Action::Pass, None).unwrap();
    c.apply_action(priority.other(), Action::Pass, None).unwrap();

    let first = c.state().player(Seat::First);
    assert_eq!(first.max_mana(), 2);
    assert_eq!(first.mana(), 1);
    assert!(first.status().has(Status::Dulled));
    assert!(!first.status().has(Status::Dull));

    assert_eq!(
        c.state().check_play(Seat::Second, 0),
        Err(Rejection::Restricted { index: 0 })
    );
    assert!(c.state().check_play(Seat::Second, 1).is_ok());
}

#[test]
fn test_flock_creates_a_dove_at_upkeep() {
    let mut c = game(vanilla_deck(14, 1, 1), vanilla_deck(14, 1, 1), Rules::default());
    keep_all(&mut c);
    c.state_mut().add_status(Seat::Second, Status::Flock, 1);

    let priority = c.state().priority();
    c.apply_action(priority, Action::Pass, None).unwrap();
    c.apply_action(priority.other(), Action::Pass, None).unwrap();

    let second = c.state().player(Seat::Second);
    assert_eq!(second.hand()[3].info().name, "Dove");
    assert_eq!(second.created(), 1);
    check_invariants(c.state());
}

// =========================================================================
// Hooks
// =========================================================================

/// Enters the story as a Truth.
#[derive(Debug)]
struct Disguise {
    info: CardInfo,
}

impl Card for Disguise {
    fn info(&self) -> &CardInfo {
        &self.info
    }

    fn on_play(&self, _player: Seat, _state: &mut GameState) -> Option<CardRef> {
        Some(cards::truth())
    }
}

#[test]
fn test_on_play_replacement_enters_the_story() {
    let disguises = || -> Vec<CardRef> {
        (0..14)
            .map(|_| -> CardRef {
                std::sync::Arc::new(Disguise {
                    info: CardInfo::new(950, "Disguise", 0, 0),
                })
            })
            .collect()
    };
    let mut c = game(disguises(), disguises(), Rules::default());
    keep_all(&mut c);
    let priority = c.state().priority();
    c.apply_action(priority, Action::Play { index: 0 }, None)
        .unwrap();

    let act = c.state().story().get(0).unwrap();
    assert_eq!(act.card.info().name, "Truth");
    assert_eq!(c.state().player(priority).expended().len(), 1);
    check_invariants(c.state());
}

#[test]
fn test_vision_reveals_opponent_acts() {
    let catalog = Catalog::standard();
    let nectars = vec![CardId(25); 14];
    let doves = vec![CardId(4); 14];
    let mut c = TurnController::from_catalog(
        &catalog,
        [nectars.as_slice(), doves.as_slice()],
        Rules::default(),
        Some(SEED),
    )
    .unwrap();
    keep_all(&mut c);

    let truth = || Vanilla::card(CardInfo::new(61, "Truth", 6, 7));
    c.state_mut()
        .story_mut()
        .add_act(truth(), Seat::Second, Provenance::Hand, None);
    assert_eq!(c.state().seen_acts(Seat::First), 0);

    // Nectar grants sight when played, whoever holds priority.
    if c.state().priority() == Seat::Second {
        c.apply_action(Seat::Second, Action::Pass, None).unwrap();
    }
    c.apply_action(Seat::First, Action::Play { index: 0 }, None)
        .unwrap();
    assert_eq!(c.state().player(Seat::First).vision(), 3);
    assert_eq!(c.state().seen_acts(Seat::First), 1);

    let view = c.project_view(Seat::First, 0);
    assert!(view.story[0].card.is_some());
}

/// Scores, then queues a Chained behind itself.
#[derive(Debug)]
struct Chain {
    info: CardInfo,
}

impl Card for Chain {
    fn info(&self) -> &CardInfo {
        &self.info
    }

    fn play(&self, player: Seat, state: &mut GameState, _index: usize, bonus: i32) -> Result<String> {
        let chained = Vanilla::card(CardInfo::new(952, "Chained", 0, 1));
        state.create_in_story(player, chained, None);
        Ok(award_points(&self.info, player, state, bonus))
    }
}

#[test]
fn test_act_added_while_resolving_resolves_in_same_run() {
    let mut c = game(vanilla_deck(14, 1, 1), vanilla_deck(14, 1, 1), Rules::default());
    keep_all(&mut c);
    let chain: CardRef = std::sync::Arc::new(Chain {
        info: CardInfo::new(951, "Chain", 0, 1),
    });
    c.state_mut().create_in_story(Seat::First, chain, None);

    end_round(&mut c);

    let lines: Vec<(&str, &str)> = c
        .state()
        .recap()
        .entries()
        .iter()
        .map(|e| (e.card.name.as_str(), e.result.as_str()))
        .collect();
    assert_eq!(lines, vec![("Chain", "+1"), ("Chained", "+1")]);
    assert_eq!(c.state().player(Seat::First).round_results(), &[2]);
    assert_eq!(c.state().player(Seat::First).pile().len(), 2);
    assert!(c.state().story().is_empty());
    check_invariants(c.state());
}

#[test]
fn test_awakened_keeps_vision_across_upkeep() {
    let catalog = Catalog::standard();
    let awakenings = vec![CardId(39); 14];
    let doves = vec![CardId(4); 14];
    let rules = Rules {
        start_mana: 3,
        ..Rules::default()
    };
    let mut c = TurnController::from_catalog(
        &catalog,
        [awakenings.as_slice(), doves.as_slice()],
        rules,
        Some(SEED),
    )
    .unwrap();
    keep_all(&mut c);

    give_priority(&mut c, Seat::First);
    c.apply_action(Seat::First, Action::Play { index: 0 }, None)
        .unwrap();
    assert_eq!(c.state().player(Seat::First).vision(), 5);
    assert!(c.state().player(Seat::First).status().has(Status::Awakened));
    c.state_mut().sight(Seat::Second, 2);

    c.apply_action(Seat::Second, Action::Pass, None).unwrap();
    c.apply_action(Seat::First, Action::Pass, None).unwrap();
    assert_eq!(c.state().round(), 1);

    assert_eq!(c.state().player(Seat::First).vision(), 5);
    assert_eq!(c.state().player(Seat::Second).vision(), 0);
}

#[test]
fn test_dawn_returns_to_hand_in_the_morning() {
    let mut c = game(vanilla_deck(14, 1, 1), vanilla_deck(14, 1, 1), Rules::default());
    keep_all(&mut c);
    c.state_mut().create_in_pile(Seat::First, cards::dawn());

    end_round(&mut c);

    let first = c.state().player(Seat::First);
    assert!(first.pile().is_empty());
    assert!(hand_names(c.state(), Seat::First).contains(&"Dawn".to_string()));
    assert_eq!(first.hand().len(), 6);
    check_invariants(c.state());
}

#[test]
fn test_nest_puts_a_dove_in_the_story_each_morning() {
    let mut c = game(vanilla_deck(14, 1, 1), vanilla_deck(14, 1, 1), Rules::default());
    keep_all(&mut c);
    c.state_mut().create_in_pile(Seat::Second, cards::nest());

    end_round(&mut c);

    let story = c.state().story();
    assert_eq!(story.len(), 1);
    let act = story.get(0).unwrap();
    assert_eq!(act.card.info().name, "Dove");
    assert_eq!(act.owner, Seat::Second);

    let second = c.state().player(Seat::Second);
    assert_eq!(second.pile().last().map(|c| c.info().name.as_str()), Some("Nest"));
    assert_eq!(second.created(), 2);
    check_invariants(c.state());
}

#[test]
fn test_kindling_in_hand_nourishes_on_each_play() {
    let mut c = game(vanilla_deck(14, 1, 1), vanilla_deck(14, 1, 1), Rules::default());
    keep_all(&mut c);
    assert!(c.state_mut().create_card(Seat::First, cards::kindling()));

    give_priority(&mut c, Seat::First);
    c.apply_action(Seat::First, Action::Play { index: 0 }, None)
        .unwrap();

    let first = c.state().player(Seat::First);
    assert_eq!(first.status().count(Status::Nourish), 1);
    assert!(hand_names(c.state(), Seat::First).contains(&"Kindling".to_string()));
    assert!(!c.state().player(Seat::Second).status().has(Status::Nourish));
}

#[test]
fn test_oak_nourishes_by_final_margin_after_story_drains() {
    let mut c = game(vanilla_deck(14, 1, 1), vanilla_deck(14, 1, 1), Rules::default());
    keep_all(&mut c);
    let three = Vanilla::card(CardInfo::new(953, "Three", 0, 3));
    c.state_mut().create_in_story(Seat::First, cards::oak(), None);
    c.state_mut().create_in_story(Seat::Second, three, None);

    end_round(&mut c);

    // 8 - 3, counted after the Second player's act resolved.
    assert_eq!(c.state().player(Seat::First).round_results(), &[8]);
    assert_eq!(c.state().player(Seat::Second).round_results(), &[3]);
    assert_eq!(c.state().player(Seat::First).status().count(Status::Nourish), 5);
    assert!(!c.state().player(Seat::Second).status().has(Status::Nourish));
    check_invariants(c.state());
}

#[test]
fn test_seen_in_hand_gives_opponent_sight_at_upkeep() {
    let mut c = game(vanilla_deck(14, 1, 1), vanilla_deck(14, 1, 1), Rules::default());
    keep_all(&mut c);
    assert!(c.state_mut().create_card(Seat::First, cards::seen()));
    c.state_mut().sight(Seat::First, 2);

    end_round(&mut c);

    assert_eq!(c.state().player(Seat::Second).vision(), 3);
    assert_eq!(c.state().player(Seat::First).vision(), 0);
    assert!(hand_names(c.state(), Seat::First).contains(&"Seen".to_string()));
}

// =========================================================================
// Whole matches
// =========================================================================

#[test]
fn test_full_match_keeps_invariants() {
    let catalog = Catalog::standard();
    let list = |ids: &[u32]| -> Vec<CardId> {
        ids.iter().cycle().take(20).map(|id| CardId(*id)).collect()
    };
    let first = list(&[3, 2, 4, 11, 6, 34, 41, 27, 60, 50]);
    let second = list(&[8, 23, 48, 76, 33, 38, 58, 87, 903, 905]);
    let mut c = TurnController::from_catalog(
        &catalog,
        [first.as_slice(), second.as_slice()],
        Rules::default(),
        Some(SEED),
    )
    .unwrap();
    keep_all(&mut c);
    check_invariants(c.state());

    for _ in 0..400 {
        if c.winner().is_some() {
            break;
        }
        let seat = c.state().priority();
        let playable = (0..c.state().player(seat).hand().len()).find(|i| c.state().can_play(seat, *i));
        let before = c.version();
        let action = match playable {
            Some(index) if c.state().story().len() < 6 => Action::Play { index },
            _ => Action::Pass,
        };
        match c.apply_action(seat, action, Some(before)) {
            Ok(()) => assert_eq!(c.version(), before + 1),
            Err(err) => {
                assert_eq!(err.rejection(), Some(&Rejection::PassLocked));
                let index = playable.unwrap();
                c.apply_action(seat, Action::Play { index }, None).unwrap();
            }
        }
        check_invariants(c.state());
    }
    assert!(c.state().round() > 0);
}
