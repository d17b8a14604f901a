//! # cheat-bots: bot policies for the Cheat engine
//!
//! The closed set of seat-driving strategies: a deterministic-random
//! baseline, a probability-estimating heuristic, and the human marker kind
//! that the interactive session suspends on instead of dispatching.
//!
//! Every bot owns an independently seeded [`ChaCha20Rng`]. The generator's
//! exact internal state can be exported and re-imported as an opaque JSON
//! blob, which is what keeps saved sessions bit-identical on resume: a
//! reseed would replay the stream from the start, not from where the bot
//! left off.
//!
//! ```rust
//! use cheat_bots::{Bot, BotKind};
//!
//! let seats = vec![BotKind::Human, BotKind::Random, BotKind::Heuristic];
//! let bots = cheat_bots::spawn_bots(&seats, Some(7));
//! assert!(bots[0].is_none()); // the human seat has no policy
//! assert_eq!(bots[2].as_ref().map(Bot::kind), Some(BotKind::Heuristic));
//! ```

use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cheat_engine::bot::{BotPolicy, PublicView};
use cheat_engine::cards::{Card, Rank};

pub mod heuristic;
pub mod random;

pub use heuristic::HeuristicBot;
pub use random::RandomBot;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BotError {
    #[error("unknown bot type: {0}")]
    UnknownBotType(String),
    #[error("human seats cannot be driven in batch mode")]
    HumanSeat,
}

/// The fixed set of seat kinds. New strategies are added as new variants,
/// not open-ended lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotKind {
    Random,
    Heuristic,
    /// A seat driven externally through the interactive session; never
    /// dispatched as a policy.
    Human,
}

impl BotKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BotKind::Random => "random",
            BotKind::Heuristic => "heuristic",
            BotKind::Human => "human",
        }
    }
}

impl fmt::Display for BotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BotKind {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(BotKind::Random),
            "heuristic" => Ok(BotKind::Heuristic),
            "human" => Ok(BotKind::Human),
            other => Err(BotError::UnknownBotType(other.to_string())),
        }
    }
}

/// A dispatchable bot policy. Closed enum rather than trait objects so the
/// variant set is part of the API.
#[derive(Debug, Clone)]
pub enum Bot {
    Random(RandomBot),
    Heuristic(HeuristicBot),
}

impl Bot {
    /// Build a policy of the given kind around `rng`. `None` for the human
    /// kind, which has no automated policy.
    pub fn new(kind: BotKind, rng: ChaCha20Rng) -> Option<Bot> {
        match kind {
            BotKind::Random => Some(Bot::Random(RandomBot::new(rng))),
            BotKind::Heuristic => Some(Bot::Heuristic(HeuristicBot::new(rng))),
            BotKind::Human => None,
        }
    }

    pub fn kind(&self) -> BotKind {
        match self {
            Bot::Random(_) => BotKind::Random,
            Bot::Heuristic(_) => BotKind::Heuristic,
        }
    }

    /// Export the generator's exact internal state as an opaque blob.
    pub fn rng_state(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Bot::Random(b) => serde_json::to_value(b.rng()),
            Bot::Heuristic(b) => serde_json::to_value(b.rng()),
        }
    }

    /// Restore a previously exported generator state.
    pub fn restore_rng_state(&mut self, state: &serde_json::Value) -> Result<(), serde_json::Error> {
        let rng: ChaCha20Rng = serde_json::from_value(state.clone())?;
        match self {
            Bot::Random(b) => b.set_rng(rng),
            Bot::Heuristic(b) => b.set_rng(rng),
        }
        Ok(())
    }
}

impl BotPolicy for Bot {
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    fn choose_active_rank(&mut self, hand: &[Card], public: &PublicView) -> Rank {
        match self {
            Bot::Random(b) => b.choose_active_rank(hand, public),
            Bot::Heuristic(b) => b.choose_active_rank(hand, public),
        }
    }

    fn choose_play(&mut self, hand: &[Card], public: &PublicView) -> (Vec<Card>, Rank) {
        match self {
            Bot::Random(b) => b.choose_play(hand, public),
            Bot::Heuristic(b) => b.choose_play(hand, public),
        }
    }

    fn should_challenge(&mut self, hand: &[Card], public: &PublicView) -> bool {
        match self {
            Bot::Random(b) => b.should_challenge(hand, public),
            Bot::Heuristic(b) => b.should_challenge(hand, public),
        }
    }

    fn last_challenge_eval(&mut self) -> Option<String> {
        match self {
            Bot::Random(b) => b.last_challenge_eval(),
            Bot::Heuristic(b) => b.last_challenge_eval(),
        }
    }
}

/// Seed one policy per seat from a master stream. Every seat consumes one
/// sub-seed draw, human seats included, so the stream alignment does not
/// depend on where the human sits. An omitted seed is drawn from entropy.
pub fn spawn_bots(kinds: &[BotKind], seed: Option<u64>) -> Vec<Option<Bot>> {
    let mut master = ChaCha20Rng::seed_from_u64(seed.unwrap_or_else(rand::random));
    kinds
        .iter()
        .map(|&kind| {
            let sub_seed = master.random_range(0..=1_000_000u64);
            Bot::new(kind, ChaCha20Rng::seed_from_u64(sub_seed))
        })
        .collect()
}

/// Like [`spawn_bots`] but for batch simulation, where a human seat is an
/// error rather than a suspension point.
pub fn spawn_table(kinds: &[BotKind], seed: Option<u64>) -> Result<Vec<Bot>, BotError> {
    spawn_bots(kinds, seed)
        .into_iter()
        .map(|bot| bot.ok_or(BotError::HumanSeat))
        .collect()
}
