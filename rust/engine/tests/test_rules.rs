use cheat_engine::cards::{Card, Rank};
use cheat_engine::engine::Engine;
use cheat_engine::errors::GameError;
use cheat_engine::game::{GameState, PlayerState};
use cheat_engine::replay::{build_metadata, Event, ReplayRecorder};

fn card(token: &str) -> Card {
    token.parse().expect("valid card token")
}

fn cards(tokens: &[&str]) -> Vec<Card> {
    tokens.iter().map(|t| card(t)).collect()
}

/// Engine with fixed hands instead of a dealt deck, for rule scenarios.
fn rigged(hands: Vec<Vec<Card>>) -> Engine {
    let names: Vec<String> = (0..hands.len()).map(|_| "scripted".to_string()).collect();
    let players: Vec<PlayerState> = hands
        .into_iter()
        .zip(&names)
        .map(|(hand, name)| PlayerState::new(hand, name.clone()))
        .collect();
    let state = GameState::new(players, Some(1));
    let metadata = build_metadata(Some(1), names.len(), names);
    let mut recorder = ReplayRecorder::new(metadata, 10);
    recorder.set_initial_state(state.projection());
    recorder.record(Event::GameStart);
    Engine::from_parts(state, recorder, Vec::new(), None, None, false)
}

#[test]
fn caught_lie_sends_pile_to_the_player() {
    let mut engine = rigged(vec![cards(&["3♣"]), cards(&["2♦"])]);
    engine.select_active_rank(0, Rank::Two).unwrap();
    engine.play(0, &cards(&["3♣"]), Rank::Two).unwrap();
    // Hand emptied before the challenge, so the placement already stands.
    assert_eq!(engine.state().players[0].placement, Some(1));
    assert_eq!(engine.challenge_seat(), Some(1));

    engine.decide_challenge(1, true).unwrap();
    assert_eq!(engine.state().players[0].hand, cards(&["3♣"]));
    assert_eq!(engine.state().players[1].hand, cards(&["2♦"]));
    assert!(engine.state().pile.is_empty());
    assert_eq!(engine.active_rank(), None);
    assert_eq!(engine.state().pile_pickups, vec![1]);
    assert_eq!(engine.state().players[0].placement, Some(1));
    assert_eq!(engine.state().known_revealed[&Rank::Three], 1);
}

#[test]
fn truthful_play_sends_pile_to_the_challenger() {
    let mut engine = rigged(vec![cards(&["2♣", "2♦", "9♣"]), cards(&["4♣", "4♦"])]);
    engine.select_active_rank(0, Rank::Two).unwrap();
    engine.play(0, &cards(&["2♣", "2♦"]), Rank::Two).unwrap();
    engine.decide_challenge(1, true).unwrap();

    assert_eq!(engine.state().players[0].hand, cards(&["9♣"]));
    assert_eq!(engine.state().players[1].hand.len(), 4);
    assert!(engine.state().pile.is_empty());
    assert_eq!(engine.active_rank(), None);
    // Turn passes to the seat after the pile recipient.
    assert_eq!(engine.current_player(), Some(0));

    let stats = &engine.state().challenge_stats["scripted"];
    assert_eq!(stats.opportunities, 1);
    assert_eq!(stats.attempts, 1);
    assert_eq!(stats.success, 0);
}

#[test]
fn declined_challenge_passes_the_turn() {
    let mut engine = rigged(vec![cards(&["2♣", "9♣"]), cards(&["4♣"])]);
    engine.select_active_rank(0, Rank::Two).unwrap();
    engine.play(0, &cards(&["2♣"]), Rank::Two).unwrap();
    engine.decide_challenge(1, false).unwrap();

    assert_eq!(engine.current_player(), Some(1));
    assert_eq!(engine.state().pile.len(), 1);
    assert_eq!(engine.active_rank(), Some(Rank::Two));
    let stats = &engine.state().challenge_stats["scripted"];
    assert_eq!(stats.opportunities, 1);
    assert_eq!(stats.attempts, 0);
}

#[test]
fn rank_selection_guards() {
    let mut engine = rigged(vec![cards(&["2♣"]), cards(&["4♣"])]);
    assert_eq!(
        engine.select_active_rank(1, Rank::Two),
        Err(GameError::NotPlayersTurn {
            expected: 0,
            actual: 1
        })
    );
    engine.select_active_rank(0, Rank::Two).unwrap();
    assert_eq!(
        engine.select_active_rank(0, Rank::Five),
        Err(GameError::RankAlreadySet)
    );
    assert_eq!(
        engine.select_active_rank(9, Rank::Two),
        Err(GameError::SeatOutOfRange(9))
    );
}

#[test]
fn play_requires_a_selected_rank_and_matching_claim() {
    let mut engine = rigged(vec![cards(&["2♣", "3♣"]), cards(&["4♣"])]);
    assert_eq!(
        engine.play(0, &cards(&["2♣"]), Rank::Two),
        Err(GameError::RankNotSelected)
    );
    engine.select_active_rank(0, Rank::Two).unwrap();
    assert_eq!(
        engine.play(0, &cards(&["2♣"]), Rank::Five),
        Err(GameError::ClaimMismatch {
            claimed: Rank::Five,
            active: Rank::Two
        })
    );
}

#[test]
fn play_size_must_be_one_to_three() {
    let mut engine = rigged(vec![
        cards(&["2♣", "2♦", "2♥", "3♠", "5♣"]),
        cards(&["4♣"]),
    ]);
    engine.select_active_rank(0, Rank::Two).unwrap();
    assert_eq!(
        engine.play(0, &[], Rank::Two),
        Err(GameError::InvalidPlaySize { count: 0 })
    );
    assert_eq!(
        engine.play(0, &cards(&["2♣", "2♦", "2♥", "3♠"]), Rank::Two),
        Err(GameError::InvalidPlaySize { count: 4 })
    );
}

#[test]
fn rejected_play_leaves_the_hand_untouched() {
    let mut engine = rigged(vec![cards(&["5♣", "6♦"]), cards(&["4♣"])]);
    engine.select_active_rank(0, Rank::Five).unwrap();
    // Requesting the same card twice must not eat the single copy.
    let result = engine.play(0, &cards(&["5♣", "5♣"]), Rank::Five);
    assert_eq!(
        result,
        Err(GameError::CardNotInHand {
            seat: 0,
            card: card("5♣")
        })
    );
    assert_eq!(engine.state().players[0].hand, cards(&["5♣", "6♦"]));
    assert!(engine.state().pile.is_empty());
    assert_eq!(engine.state().turn_count, 0);
}

#[test]
fn open_challenge_window_blocks_other_operations() {
    let mut engine = rigged(vec![cards(&["2♣", "9♣"]), cards(&["4♣", "4♦"])]);
    engine.select_active_rank(0, Rank::Two).unwrap();
    engine.play(0, &cards(&["2♣"]), Rank::Two).unwrap();

    assert_eq!(
        engine.play(1, &cards(&["4♣"]), Rank::Two),
        Err(GameError::ChallengePending)
    );
    assert_eq!(
        engine.decide_challenge(0, true),
        Err(GameError::NotPlayersTurn {
            expected: 1,
            actual: 0
        })
    );
    engine.decide_challenge(1, false).unwrap();
    assert_eq!(
        engine.decide_challenge(1, false),
        Err(GameError::NoChallengePending)
    );
}

#[test]
fn quad_discard_can_finish_a_hand() {
    let mut engine = rigged(vec![
        cards(&["5♣", "5♦", "5♥", "5♠", "6♣", "6♦", "6♥", "6♠"]),
        cards(&["4♣"]),
    ]);
    engine.check_wins();
    engine.resolve_discard_quads();

    let player = &engine.state().players[0];
    assert!(player.hand.is_empty());
    assert_eq!(player.placement, Some(1));
    assert_eq!(player.discarded.len(), 8);
    assert_eq!(engine.state().known_discarded[&Rank::Five], 4);
    assert_eq!(engine.state().known_discarded[&Rank::Six], 4);

    let quads = engine
        .events()
        .iter()
        .filter(|e| matches!(e, Event::DiscardQuad { .. }))
        .count();
    assert_eq!(quads, 2);
}

#[test]
fn ace_quads_are_never_discarded() {
    let mut engine = rigged(vec![
        cards(&["A♣", "A♦", "A♥", "A♠", "2♣"]),
        cards(&["4♣"]),
    ]);
    engine.resolve_discard_quads();
    assert_eq!(engine.state().players[0].hand.len(), 5);
    assert_eq!(engine.state().known_discarded[&Rank::Ace], 0);
}

#[test]
fn sole_survivor_rotates_back_to_itself() {
    let mut engine = rigged(vec![cards(&["2♣"]), cards(&["3♣", "4♣"])]);
    engine.select_active_rank(0, Rank::Two).unwrap();
    engine.play(0, &cards(&["2♣"]), Rank::Two).unwrap();
    assert_eq!(engine.state().players[0].placement, Some(1));
    engine.decide_challenge(1, true).unwrap();

    // Seat 1 is the only active seat left; rotation wraps to itself.
    assert_eq!(engine.current_player(), Some(1));
    assert!(!engine.is_finished());
}

#[test]
fn game_ends_when_every_seat_has_a_placement() {
    let mut engine = rigged(vec![cards(&["2♣"]), cards(&["2♦"])]);
    engine.select_active_rank(0, Rank::Two).unwrap();
    engine.play(0, &cards(&["2♣"]), Rank::Two).unwrap();
    engine.decide_challenge(1, false).unwrap();
    engine.play(1, &cards(&["2♦"]), Rank::Two).unwrap();

    assert!(engine.is_finished());
    assert_eq!(engine.current_player(), None);
    assert_eq!(engine.state().placements, vec![0, 1]);
    assert!(matches!(
        engine.events().last(),
        Some(Event::GameEnd { .. })
    ));
    assert_eq!(
        engine.select_active_rank(0, Rank::Two),
        Err(GameError::GameOver)
    );
}
