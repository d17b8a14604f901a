//! Baseline policy: uniform decisions, useful for smoke tests and as a
//! benchmark opponent.

use rand::seq::{index, IndexedRandom};
use rand::Rng;
use rand_chacha::ChaCha20Rng;

use cheat_engine::bot::{BotPolicy, PublicView};
use cheat_engine::cards::{all_ranks, Card, Rank};

#[derive(Debug, Clone)]
pub struct RandomBot {
    rng: ChaCha20Rng,
}

impl RandomBot {
    pub fn new(rng: ChaCha20Rng) -> Self {
        Self { rng }
    }

    pub fn rng(&self) -> &ChaCha20Rng {
        &self.rng
    }

    pub fn set_rng(&mut self, rng: ChaCha20Rng) {
        self.rng = rng;
    }
}

impl BotPolicy for RandomBot {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose_active_rank(&mut self, _hand: &[Card], _public: &PublicView) -> Rank {
        let ranks = all_ranks();
        ranks.choose(&mut self.rng).copied().unwrap_or(Rank::Two)
    }

    fn choose_play(&mut self, hand: &[Card], public: &PublicView) -> (Vec<Card>, Rank) {
        let want = [1usize, 2, 3].choose(&mut self.rng).copied().unwrap_or(1);
        let count = want.min(hand.len());
        let chosen: Vec<Card> = index::sample(&mut self.rng, hand.len(), count)
            .iter()
            .map(|i| hand[i])
            .collect();
        let claim = public
            .active_rank
            .unwrap_or_else(|| self.choose_active_rank(hand, public));
        (chosen, claim)
    }

    fn should_challenge(&mut self, hand: &[Card], public: &PublicView) -> bool {
        let Some(active) = public.active_rank else {
            return false;
        };
        let count_active = hand.iter().filter(|c| c.rank == active).count();
        let base = (0.1 + public.pile_size as f64 / 40.0).min(0.6);
        let adjustment = 0.08 * count_active as f64;
        let threshold = (base - adjustment).max(0.05);
        self.rng.random::<f64>() < threshold
    }
}
