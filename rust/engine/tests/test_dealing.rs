use std::collections::HashSet;

use cheat_engine::cards::Card;
use cheat_engine::deck::Deck;
use cheat_engine::errors::GameError;

#[test]
fn deal_splits_the_whole_deck_round_robin() {
    let mut deck = Deck::new_with_seed(42);
    deck.shuffle();
    let hands = deck.deal(4).expect("valid player count");
    assert_eq!(hands.len(), 4);
    for hand in &hands {
        assert_eq!(hand.len(), 13);
    }
}

#[test]
fn uneven_deal_differs_by_at_most_one() {
    let mut deck = Deck::new_with_seed(7);
    deck.shuffle();
    let hands = deck.deal(3).expect("valid player count");
    let sizes: Vec<usize> = hands.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![18, 17, 17]);
}

#[test]
fn dealt_cards_are_52_unique() {
    let mut deck = Deck::new_with_seed(99);
    deck.shuffle();
    let hands = deck.deal(5).expect("valid player count");
    let all: HashSet<Card> = hands.into_iter().flatten().collect();
    assert_eq!(all.len(), 52);
}

#[test]
fn same_seed_deals_identical_hands() {
    let mut d1 = Deck::new_with_seed(12345);
    let mut d2 = Deck::new_with_seed(12345);
    d1.shuffle();
    d2.shuffle();
    assert_eq!(d1.deal(4).unwrap(), d2.deal(4).unwrap());
}

#[test]
fn different_seeds_deal_different_hands() {
    let mut d1 = Deck::new_with_seed(1);
    let mut d2 = Deck::new_with_seed(2);
    d1.shuffle();
    d2.shuffle();
    assert_ne!(d1.deal(4).unwrap(), d2.deal(4).unwrap());
}

#[test]
fn player_count_outside_bounds_is_rejected() {
    let mut deck = Deck::new_with_seed(0);
    deck.shuffle();
    assert_eq!(deck.deal(1), Err(GameError::InvalidPlayerCount(1)));
    assert_eq!(deck.deal(7), Err(GameError::InvalidPlayerCount(7)));
}
