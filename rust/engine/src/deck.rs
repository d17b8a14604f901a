use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};
use crate::errors::GameError;

/// The 52-card deck with a deterministic ChaCha20 shuffle.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    rng: ChaCha20Rng,
}

impl Deck {
    pub fn new_with_seed(seed: u64) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(seed);
        // Keep initial order until shuffle is called explicitly
        Self {
            cards: full_deck(),
            rng,
        }
    }

    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        self.cards.shuffle(&mut self.rng);
    }

    /// Deal the whole deck round-robin to `num_players` hands. Hand sizes
    /// differ by at most one card.
    pub fn deal(&self, num_players: usize) -> Result<Vec<Vec<Card>>, GameError> {
        if !(2..=6).contains(&num_players) {
            return Err(GameError::InvalidPlayerCount(num_players));
        }
        let mut hands = vec![Vec::with_capacity(52 / num_players + 1); num_players];
        for (idx, card) in self.cards.iter().enumerate() {
            hands[idx % num_players].push(*card);
        }
        Ok(hands)
    }
}
