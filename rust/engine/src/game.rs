use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cards::{empty_rank_counts, Card, Rank};
use crate::replay::{ReplayPlayerState, ReplayState};

/// One seat at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Hand order is not semantically meaningful but stays stable so that
    /// "first N cards" selections are deterministic.
    pub hand: Vec<Card>,
    /// Name of the policy driving this seat ("random", "heuristic", "human").
    pub bot: String,
    /// Finishing rank, set exactly once when the hand empties (or on forced
    /// termination), strictly increasing from 1.
    pub placement: Option<u32>,
    /// Cards this seat removed from play via four-of-a-kind discards.
    #[serde(default)]
    pub discarded: Vec<Card>,
}

impl PlayerState {
    pub fn new(hand: Vec<Card>, bot: impl Into<String>) -> Self {
        Self {
            hand,
            bot: bot.into(),
            placement: None,
            discarded: Vec::new(),
        }
    }
}

/// Challenge statistics for one policy name across a game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeStats {
    pub opportunities: u32,
    pub attempts: u32,
    pub success: u32,
}

/// One line of the human-readable turn log kept alongside the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLogEvent {
    pub message: String,
}

/// The canonical mutable aggregate for one game, exclusively owned and
/// mutated by the [`Engine`](crate::engine::Engine) while a run is live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub players: Vec<PlayerState>,
    pub rng_seed: Option<u64>,
    /// Rank currently being claimed for the pile; unset between rounds.
    pub active_rank: Option<Rank>,
    /// Face-down cards accumulated by successive claimed plays.
    pub pile: Vec<Card>,
    /// Player index of the seat to act, `None` once the game is terminal.
    pub current_player: Option<usize>,
    /// Player indices in finishing order.
    pub placements: Vec<usize>,
    pub known_discarded: BTreeMap<Rank, u32>,
    pub known_revealed: BTreeMap<Rank, u32>,
    pub turn_count: u32,
    /// Size of every pile pickup, kept for statistics.
    pub pile_pickups: Vec<usize>,
    pub challenge_stats: BTreeMap<String, ChallengeStats>,
    #[serde(skip)]
    pub log: Vec<GameLogEvent>,
}

impl GameState {
    pub fn new(players: Vec<PlayerState>, rng_seed: Option<u64>) -> Self {
        let mut challenge_stats = BTreeMap::new();
        for player in &players {
            challenge_stats
                .entry(player.bot.clone())
                .or_insert_with(ChallengeStats::default);
        }
        Self {
            players,
            rng_seed,
            active_rank: None,
            pile: Vec::new(),
            current_player: Some(0),
            placements: Vec::new(),
            known_discarded: empty_rank_counts(),
            known_revealed: empty_rank_counts(),
            turn_count: 0,
            pile_pickups: Vec::new(),
            challenge_stats,
            log: Vec::new(),
        }
    }

    /// Seats still in the game, ascending by player index.
    pub fn active_players(&self) -> Vec<usize> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.placement.is_none())
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn hand_sizes(&self) -> Vec<usize> {
        self.players.iter().map(|p| p.hand.len()).collect()
    }

    /// The seat that acts after `seat` in rotation: the next active seat in
    /// cyclic order, or the lowest-indexed active seat when `seat` itself has
    /// already finished. `None` once nobody is active.
    pub fn next_active_after(&self, seat: usize) -> Option<usize> {
        let active = self.active_players();
        if active.is_empty() {
            return None;
        }
        match active.iter().position(|&idx| idx == seat) {
            Some(pos) => Some(active[(pos + 1) % active.len()]),
            None => Some(active[0]),
        }
    }

    pub fn add_log(&mut self, message: impl Into<String>) {
        self.log.push(GameLogEvent {
            message: message.into(),
        });
    }

    /// Project this state into the replay-state shape the reducer produces.
    /// The projection and a full reduction of the recorded log must agree
    /// field for field.
    pub fn projection(&self) -> ReplayState {
        ReplayState {
            players: self
                .players
                .iter()
                .map(|p| ReplayPlayerState {
                    hand: p.hand.clone(),
                    bot: p.bot.clone(),
                    placement: p.placement,
                    discarded: p.discarded.clone(),
                })
                .collect(),
            active_rank: self.active_rank,
            pile: self.pile.clone(),
            current_player: self.current_player,
            placements: self.placements.clone(),
        }
    }
}
