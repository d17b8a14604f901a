//! Event-sourced replay: typed event log, passive recorder, reducer, and a
//! best-effort validator for persisted replay documents.
//!
//! The recorder never mutates game state; it observes the engine's accepted
//! mutations in order. The reducer reconstructs state from the initial
//! snapshot plus the log alone, independent of the engine, which is what
//! makes the log a provably lossless encoding of a run.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank};
use crate::errors::ReplayError;

/// Every state-changing decision in a game, as persisted to the replay log.
/// The set is closed: decoding any other tag fails with
/// [`ReplayError::UnknownEventType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "GAME_START")]
    GameStart,
    #[serde(rename = "SELECT_RANK")]
    SelectRank { player: usize, rank: Rank },
    #[serde(rename = "PLAY")]
    Play {
        player: usize,
        claim_rank: Rank,
        cards: Vec<Card>,
    },
    /// Free-form bot diagnostic. Not state-affecting; the reducer skips it.
    #[serde(rename = "CHALLENGE_EVAL")]
    ChallengeEval { challenger: usize, message: String },
    #[serde(rename = "CHALLENGE_DECISION")]
    ChallengeDecision { challenger: usize, challenge: bool },
    #[serde(rename = "CHALLENGE_RESOLUTION")]
    ChallengeResolution {
        challenger: usize,
        truthful: bool,
        revealed: Vec<Card>,
    },
    #[serde(rename = "PICKUP_PILE")]
    PickupPile { player: usize, cards: Vec<Card> },
    #[serde(rename = "DISCARD_QUAD")]
    DiscardQuad {
        player: usize,
        rank: Rank,
        cards: Vec<Card>,
    },
    #[serde(rename = "PLACEMENT")]
    Placement { player: usize, place: u32 },
    #[serde(rename = "GAME_END")]
    GameEnd { placements: Vec<usize> },
}

const KNOWN_EVENT_TYPES: &[&str] = &[
    "GAME_START",
    "SELECT_RANK",
    "PLAY",
    "CHALLENGE_EVAL",
    "CHALLENGE_DECISION",
    "CHALLENGE_RESOLUTION",
    "PICKUP_PILE",
    "DISCARD_QUAD",
    "PLACEMENT",
    "GAME_END",
];

/// Immutable facts about the recorded game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayMetadata {
    pub seed: Option<u64>,
    /// RFC3339 creation timestamp.
    pub timestamp: String,
    pub player_count: usize,
    pub bot_types: Vec<String>,
}

pub fn build_metadata(
    seed: Option<u64>,
    player_count: usize,
    bot_types: Vec<String>,
) -> ReplayMetadata {
    ReplayMetadata {
        seed,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        player_count,
        bot_types,
    }
}

/// One seat in a replay-state projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayPlayerState {
    pub hand: Vec<Card>,
    pub bot: String,
    pub placement: Option<u32>,
    #[serde(default)]
    pub discarded: Vec<Card>,
}

/// The state projection the reducer reconstructs: everything the log needs
/// to be checkable, nothing more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayState {
    pub players: Vec<ReplayPlayerState>,
    pub active_rank: Option<Rank>,
    pub pile: Vec<Card>,
    pub current_player: Option<usize>,
    pub placements: Vec<usize>,
}

/// A full-state checkpoint taken every K events for fast seeking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub event_index: usize,
    pub state: ReplayState,
}

/// The persisted replay document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    pub metadata: ReplayMetadata,
    pub initial_state: ReplayState,
    pub events: Vec<Event>,
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
}

pub const DEFAULT_SNAPSHOT_INTERVAL: usize = 10;

/// Passive event log builder. Invoked by the engine after each accepted
/// mutation, in mutation order; never touches game state itself.
#[derive(Debug, Clone)]
pub struct ReplayRecorder {
    metadata: ReplayMetadata,
    snapshot_interval: usize,
    initial_state: Option<ReplayState>,
    events: Vec<Event>,
}

impl ReplayRecorder {
    pub fn new(metadata: ReplayMetadata, snapshot_interval: usize) -> Self {
        Self {
            metadata,
            snapshot_interval,
            initial_state: None,
            events: Vec::new(),
        }
    }

    /// Rebuild a recorder from persisted parts (session restore).
    pub fn from_parts(
        metadata: ReplayMetadata,
        initial_state: Option<ReplayState>,
        events: Vec<Event>,
        snapshot_interval: usize,
    ) -> Self {
        Self {
            metadata,
            snapshot_interval,
            initial_state,
            events,
        }
    }

    pub fn set_initial_state(&mut self, state: ReplayState) {
        self.initial_state = Some(state);
    }

    pub fn record(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn metadata(&self) -> &ReplayMetadata {
        &self.metadata
    }

    pub fn snapshot_interval(&self) -> usize {
        self.snapshot_interval
    }

    pub fn initial_state(&self) -> Option<&ReplayState> {
        self.initial_state.as_ref()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Assemble the persistable document, deriving snapshots when the
    /// interval is non-zero.
    pub fn build_replay(&self) -> Result<Replay, ReplayError> {
        let initial_state = self
            .initial_state
            .clone()
            .ok_or(ReplayError::MissingInitialState)?;
        let mut replay = Replay {
            metadata: self.metadata.clone(),
            initial_state,
            events: self.events.clone(),
            snapshots: Vec::new(),
        };
        if self.snapshot_interval > 0 {
            replay.snapshots = build_snapshots(&replay, self.snapshot_interval)?;
        }
        Ok(replay)
    }
}

/// Reconstruct the state after the first `upto` events (all of them when
/// `None`), starting from the initial snapshot.
pub fn reduce(replay: &Replay, upto: Option<usize>) -> Result<ReplayState, ReplayError> {
    let mut state = replay.initial_state.clone();
    let upto = upto.unwrap_or(replay.events.len()).min(replay.events.len());
    for event in &replay.events[..upto] {
        apply_event(&mut state, event)?;
    }
    Ok(state)
}

/// Apply one event to a replay-state projection, reproducing the exact
/// mutation the engine performed when it recorded the event.
pub fn apply_event(state: &mut ReplayState, event: &Event) -> Result<(), ReplayError> {
    match event {
        Event::GameStart | Event::ChallengeEval { .. } | Event::ChallengeResolution { .. } => {}
        Event::SelectRank { rank, .. } => {
            state.active_rank = Some(*rank);
        }
        Event::Play { player, cards, .. } => {
            {
                let hand = &mut player_mut(state, *player)?.hand;
                remove_cards(hand, cards, *player)?;
            }
            state.pile.extend(cards.iter().copied());
        }
        Event::ChallengeDecision {
            challenger,
            challenge,
        } => {
            if !challenge {
                state.current_player = Some(*challenger);
            }
        }
        Event::PickupPile { player, cards } => {
            player_mut(state, *player)?.hand.extend(cards.iter().copied());
            state.pile.clear();
            state.active_rank = None;
            state.current_player = next_active_player(state, *player);
        }
        Event::DiscardQuad { player, cards, .. } => {
            let seat = player_mut(state, *player)?;
            remove_cards(&mut seat.hand, cards, *player)?;
            seat.discarded.extend(cards.iter().copied());
        }
        Event::Placement { player, place } => {
            player_mut(state, *player)?.placement = Some(*place);
            state.placements.push(*player);
            if state.current_player == Some(*player) {
                state.current_player = next_active_player(state, *player);
            }
        }
        Event::GameEnd { .. } => {
            state.current_player = None;
        }
    }
    Ok(())
}

fn player_mut(state: &mut ReplayState, player: usize) -> Result<&mut ReplayPlayerState, ReplayError> {
    state
        .players
        .get_mut(player)
        .ok_or(ReplayError::PlayerOutOfRange(player))
}

fn remove_cards(hand: &mut Vec<Card>, cards: &[Card], player: usize) -> Result<(), ReplayError> {
    for card in cards {
        let pos = hand
            .iter()
            .position(|c| c == card)
            .ok_or(ReplayError::CardNotInHand {
                player,
                card: *card,
            })?;
        hand.remove(pos);
    }
    Ok(())
}

fn next_active_player(state: &ReplayState, after_player: usize) -> Option<usize> {
    let active: Vec<usize> = state
        .players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.placement.is_none())
        .map(|(idx, _)| idx)
        .collect();
    if active.is_empty() {
        return None;
    }
    match active.iter().position(|&idx| idx == after_player) {
        Some(pos) => Some(active[(pos + 1) % active.len()]),
        None => Some(active[0]),
    }
}

/// Walk the log once and checkpoint the full state every `interval` events.
/// An interval of zero disables snapshotting.
pub fn build_snapshots(replay: &Replay, interval: usize) -> Result<Vec<Snapshot>, ReplayError> {
    if interval == 0 {
        return Ok(Vec::new());
    }
    let mut state = replay.initial_state.clone();
    let mut snapshots = Vec::new();
    for (idx, event) in replay.events.iter().enumerate() {
        apply_event(&mut state, event)?;
        if (idx + 1) % interval == 0 {
            snapshots.push(Snapshot {
                event_index: idx + 1,
                state: state.clone(),
            });
        }
    }
    Ok(snapshots)
}

/// Decode a single raw event, distinguishing unknown tags from otherwise
/// malformed payloads.
pub fn decode_event(value: &serde_json::Value) -> Result<Event, ReplayError> {
    let tag = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| ReplayError::MalformedEvent("missing type tag".to_string()))?;
    if !KNOWN_EVENT_TYPES.contains(&tag) {
        return Err(ReplayError::UnknownEventType(tag.to_string()));
    }
    Event::deserialize(value).map_err(|e| ReplayError::MalformedEvent(e.to_string()))
}

/// Replay a raw document from its initial snapshot, checking after every
/// event that (a) the total card count matches the initial deal and (b) the
/// card multiset is conserved. Collects diagnostics instead of aborting,
/// since the job is to characterize how broken a log is.
pub fn validate_replay(doc: &serde_json::Value) -> Vec<String> {
    let mut errors = Vec::new();
    let initial = match doc.get("initial_state") {
        Some(value) => match ReplayState::deserialize(value) {
            Ok(state) => state,
            Err(e) => return vec![format!("Invalid initial state: {e}")],
        },
        None => return vec!["Invalid initial state: missing".to_string()],
    };

    let mut initial_cards: Vec<Card> = Vec::with_capacity(52);
    for player in &initial.players {
        initial_cards.extend(player.hand.iter().copied());
        initial_cards.extend(player.discarded.iter().copied());
    }
    initial_cards.extend(initial.pile.iter().copied());
    if initial_cards.len() != 52 {
        errors.push(format!(
            "Initial hands contain {} cards (expected 52).",
            initial_cards.len()
        ));
    }
    let initial_counts = card_counts(&initial_cards);
    if initial_counts.values().any(|&n| n > 1) {
        errors.push("Initial hands contain duplicate cards.".to_string());
    }

    let empty = Vec::new();
    let events = doc
        .get("events")
        .and_then(serde_json::Value::as_array)
        .unwrap_or(&empty);

    let mut state = initial;
    for (idx, raw) in events.iter().enumerate() {
        let idx = idx + 1;
        let event = match decode_event(raw) {
            Ok(event) => event,
            Err(e) => {
                errors.push(format!("Event {idx} failed to apply: {e}"));
                continue;
            }
        };
        if let Err(e) = apply_event(&mut state, &event) {
            errors.push(format!("Event {idx} failed to apply: {e}"));
            continue;
        }
        errors.extend(check_conservation(&state, &initial_counts, initial_cards.len(), idx));
    }
    errors
}

fn card_counts(cards: &[Card]) -> BTreeMap<Card, u32> {
    let mut counts = BTreeMap::new();
    for card in cards {
        *counts.entry(*card).or_insert(0) += 1;
    }
    counts
}

fn check_conservation(
    state: &ReplayState,
    initial_counts: &BTreeMap<Card, u32>,
    initial_len: usize,
    idx: usize,
) -> Vec<String> {
    let mut errors = Vec::new();
    let mut current: Vec<Card> = Vec::with_capacity(initial_len);
    for player in &state.players {
        current.extend(player.hand.iter().copied());
        current.extend(player.discarded.iter().copied());
    }
    current.extend(state.pile.iter().copied());
    if current.len() != initial_len {
        errors.push(format!(
            "Event {idx}: card count mismatch ({} vs {initial_len}).",
            current.len()
        ));
    }
    if &card_counts(&current) != initial_counts {
        errors.push(format!("Event {idx}: card conservation violation detected."));
    }
    errors
}
