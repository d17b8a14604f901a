//! Heuristic policy: sheds its most-held rank, bluffs with Aces (which the
//! quad rule can never remove), and challenges on an expected-value
//! estimate of the opponent's claim.

use rand::seq::IndexedRandom;
use rand_chacha::ChaCha20Rng;

use cheat_engine::bot::{BotPolicy, PublicView};
use cheat_engine::cards::{all_ranks, Card, Rank};

/// Probability that a play of `k` cards under the active rank is truthful,
/// assuming the opponent's hand is uniform over unknown cards.
/// `remaining_active` counts copies of the active rank not visible to the
/// challenger (in their own hand, discarded, or revealed).
pub fn p_truthful_play(opponent_size: usize, remaining_active: i64, k: usize) -> f64 {
    let mut prob = 1.0;
    for i in 0..k {
        let denom = opponent_size.saturating_sub(i).max(1) as f64;
        prob *= ((remaining_active - i as i64) as f64 / denom).min(1.0);
    }
    prob
}

#[derive(Debug, Clone)]
pub struct HeuristicBot {
    rng: ChaCha20Rng,
    last_eval: Option<String>,
}

impl HeuristicBot {
    pub fn new(rng: ChaCha20Rng) -> Self {
        Self {
            rng,
            last_eval: None,
        }
    }

    pub fn rng(&self) -> &ChaCha20Rng {
        &self.rng
    }

    pub fn set_rng(&mut self, rng: ChaCha20Rng) {
        self.rng = rng;
    }

    fn rank_counts(hand: &[Card]) -> Vec<(Rank, usize)> {
        all_ranks()
            .into_iter()
            .map(|rank| (rank, hand.iter().filter(|c| c.rank == rank).count()))
            .collect()
    }
}

impl BotPolicy for HeuristicBot {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn choose_active_rank(&mut self, hand: &[Card], _public: &PublicView) -> Rank {
        let counts = Self::rank_counts(hand);
        let best = counts.iter().map(|&(_, n)| n).max().unwrap_or(0);
        let mut candidates: Vec<Rank> = counts
            .iter()
            .filter(|&&(_, n)| n == best)
            .map(|&(rank, _)| rank)
            .collect();
        let non_aces: Vec<Rank> = candidates
            .iter()
            .copied()
            .filter(|&rank| rank != Rank::Ace)
            .collect();
        if !non_aces.is_empty() {
            candidates = non_aces;
        }
        candidates.choose(&mut self.rng).copied().unwrap_or(Rank::Two)
    }

    fn choose_play(&mut self, hand: &[Card], public: &PublicView) -> (Vec<Card>, Rank) {
        let active = public
            .active_rank
            .unwrap_or_else(|| self.choose_active_rank(hand, public));
        let truthful: Vec<Card> = hand.iter().filter(|c| c.rank == active).copied().collect();
        if !truthful.is_empty() {
            let count = truthful.len().min(3);
            return (truthful[..count].to_vec(), active);
        }
        // Bluffing: prefer shedding Aces, otherwise the rank held most.
        if let Some(ace) = hand.iter().find(|c| c.rank == Rank::Ace) {
            return (vec![*ace], active);
        }
        // First rank in 2..A order among those held most.
        let mut max_rank = Rank::Two;
        let mut max_count = 0;
        for (rank, count) in Self::rank_counts(hand) {
            if count > max_count {
                max_count = count;
                max_rank = rank;
            }
        }
        let chosen: Vec<Card> = hand
            .iter()
            .filter(|c| c.rank == max_rank)
            .take(2)
            .copied()
            .collect();
        if chosen.is_empty() {
            return (hand.first().map(|c| vec![*c]).unwrap_or_default(), active);
        }
        (chosen, active)
    }

    fn should_challenge(&mut self, hand: &[Card], public: &PublicView) -> bool {
        let Some(active) = public.active_rank else {
            return false;
        };
        let known_in_hand = hand.iter().filter(|c| c.rank == active).count() as i64;
        let mut remaining = 4 - known_in_hand;
        remaining -= i64::from(public.known_discarded.get(&active).copied().unwrap_or(0));
        remaining -= i64::from(public.known_revealed.get(&active).copied().unwrap_or(0));
        let remaining = remaining.max(0);

        let Some(last_player) = public.last_player else {
            return false;
        };
        let opponent_size = public.hand_sizes.get(last_player).copied().unwrap_or(0);
        let k = public.last_play_count;
        if opponent_size == 0 || k == 0 {
            return false;
        }
        let prob_truth = p_truthful_play(opponent_size, remaining, k);
        let pile = public.pile_size as f64;
        let pile_penalty = 0.6 * pile;
        // Risk adjustment if the opponent is near empty and the pile is large.
        let risk = if opponent_size <= 3 && public.pile_size >= 6 {
            1.5
        } else {
            0.0
        };
        let expected_gain = (1.0 - prob_truth) * pile - prob_truth * pile_penalty;
        self.last_eval = Some(format!(
            "p_truth={prob_truth:.3} gain={expected_gain:.2} risk={risk:.2} pile={}",
            public.pile_size
        ));
        expected_gain > risk
    }

    fn last_challenge_eval(&mut self) -> Option<String> {
        self.last_eval.take()
    }
}
