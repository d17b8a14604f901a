use std::collections::BTreeMap;

use crate::cards::{Card, Rank};

/// The restricted view of game state handed to a bot policy. It never
/// exposes the pile contents or other players' hands, only what a player
/// at the table could legitimately know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicView {
    pub active_rank: Option<Rank>,
    pub pile_size: usize,
    /// Hand size per seat, indexed by player.
    pub hand_sizes: Vec<usize>,
    pub known_discarded: BTreeMap<Rank, u32>,
    pub known_revealed: BTreeMap<Rank, u32>,
    /// Size of the most recent play, 0 outside a challenge window.
    pub last_play_count: usize,
    /// Seat of the most recent play, if a challenge window is open.
    pub last_player: Option<usize>,
}

/// Capability contract for an automated seat. The engine calls these with
/// the acting seat's own hand and the public view; the returned decisions go
/// through the same legality checks as any external action, so a defective
/// policy surfaces as a rule-violation error rather than corrupting state.
pub trait BotPolicy {
    /// Stable policy name, used for challenge statistics and replay metadata.
    fn name(&self) -> &'static str;

    /// Pick the rank to claim for a fresh round (active rank unset).
    fn choose_active_rank(&mut self, hand: &[Card], public: &PublicView) -> Rank;

    /// Pick 1-3 cards to play face-down and the rank to claim for them.
    fn choose_play(&mut self, hand: &[Card], public: &PublicView) -> (Vec<Card>, Rank);

    /// Decide whether to challenge the most recent play.
    fn should_challenge(&mut self, hand: &[Card], public: &PublicView) -> bool;

    /// Free-form diagnostic line describing the last challenge evaluation,
    /// recorded as a CHALLENGE_EVAL event when present. Consumed on read.
    fn last_challenge_eval(&mut self) -> Option<String> {
        None
    }
}
