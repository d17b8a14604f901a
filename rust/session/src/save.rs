use serde::{Deserialize, Serialize};

use cheat_bots::BotKind;
use cheat_engine::cards::Card;
use cheat_engine::game::GameState;
use cheat_engine::replay::{Event, ReplayMetadata, ReplayState};

use crate::session::PendingDecision;

pub const SAVE_VERSION: u32 = 1;

/// The recorder's persisted parts: everything needed to keep appending to
/// the same event log after a reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderSave {
    pub metadata: ReplayMetadata,
    pub initial_state: Option<ReplayState>,
    pub events: Vec<Event>,
    pub snapshot_interval: usize,
}

/// Complete serialized session. Restoring this must yield a session whose
/// future behavior is indistinguishable from the original, which is why it
/// carries every bot generator's internal state rather than just the seed,
/// and the last play still awaiting a challenge decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSave {
    pub version: u32,
    pub session_id: String,
    pub seed: Option<u64>,
    pub human_index: usize,
    pub bot_types: Vec<BotKind>,
    pub state: GameState,
    pub pending_decision: Option<PendingDecision>,
    pub last_played_cards: Vec<Card>,
    pub last_played_player: Option<usize>,
    /// One entry per seat; `None` for the human seat.
    pub bot_rng_states: Vec<Option<serde_json::Value>>,
    pub recorder: RecorderSave,
    pub paused: bool,
    pub finished: bool,
}
