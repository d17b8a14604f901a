use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use cheat_bots::{spawn_bots, Bot, BotKind};
use cheat_engine::bot::BotPolicy;
use cheat_engine::cards::{Card, Rank};
use cheat_engine::engine::Engine;
use cheat_engine::game::GameState;
use cheat_engine::replay::{Event, ReplayRecorder, DEFAULT_SNAPSHOT_INTERVAL};

use crate::errors::SessionError;
use crate::save::{RecorderSave, SessionSave, SAVE_VERSION};

/// Which decision the human seat owes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionKind {
    #[serde(rename = "SELECT_RANK")]
    SelectRank,
    #[serde(rename = "PLAY")]
    Play,
    #[serde(rename = "CHALLENGE")]
    Challenge,
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DecisionKind::SelectRank => "SELECT_RANK",
            DecisionKind::Play => "PLAY",
            DecisionKind::Challenge => "CHALLENGE",
        })
    }
}

/// The suspension marker: the named seat must act externally before the
/// turn loop can continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecision {
    #[serde(rename = "type")]
    pub kind: DecisionKind,
    pub player: usize,
}

/// An externally supplied decision for the pending seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    #[serde(rename = "SELECT_RANK")]
    SelectRank { rank: Rank },
    #[serde(rename = "PLAY")]
    Play { cards: Vec<Card> },
    #[serde(rename = "CHALLENGE")]
    Challenge { value: bool },
}

impl Action {
    fn kind(&self) -> DecisionKind {
        match self {
            Action::SelectRank { .. } => DecisionKind::SelectRank,
            Action::Play { .. } => DecisionKind::Play,
            Action::Challenge { .. } => DecisionKind::Challenge,
        }
    }
}

/// One interactive game: an engine, one human seat, and a bot policy for
/// every other seat.
pub struct GameSession {
    session_id: String,
    seed: Option<u64>,
    human_index: usize,
    bot_kinds: Vec<BotKind>,
    engine: Engine,
    bots: Vec<Option<Bot>>,
    pending: Option<PendingDecision>,
    paused: bool,
    replay_saved: bool,
}

impl GameSession {
    pub fn new(
        human_index: usize,
        bot_kinds: Vec<BotKind>,
        seed: Option<u64>,
    ) -> Result<Self, SessionError> {
        validate_seats(human_index, &bot_kinds)?;
        let names: Vec<String> = bot_kinds.iter().map(|k| k.as_str().to_string()).collect();
        let engine = Engine::new(seed, &names, DEFAULT_SNAPSHOT_INTERVAL)?;
        // The engine resolves an omitted seed from entropy; reuse the seed it
        // recorded so the saved session names the one that was actually used.
        let seed = engine.state().rng_seed;
        let bots = spawn_bots(&bot_kinds, seed);
        let session_id = Uuid::new_v4().simple().to_string();
        info!(%session_id, players = bot_kinds.len(), human_index, "session created");
        Ok(Self {
            session_id,
            seed,
            human_index,
            bot_kinds,
            engine,
            bots,
            pending: None,
            paused: false,
            replay_saved: false,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn human_index(&self) -> usize {
        self.human_index
    }

    pub fn pending_decision(&self) -> Option<PendingDecision> {
        self.pending
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_finished(&self) -> bool {
        self.engine.is_finished()
    }

    /// Full game state, including every hand. This is the debug/omniscient
    /// view; front ends building a fair player view must restrict it to the
    /// human seat's hand and the public counters.
    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    pub fn events(&self) -> &[Event] {
        self.engine.events()
    }

    /// Run bot turns until the game finishes or the human seat must decide.
    /// Cooperative suspension: when a human decision is required the pending
    /// slot is set and the loop simply returns. Yields the events recorded
    /// during this call.
    pub fn step(&mut self) -> Result<Vec<Event>, SessionError> {
        if self.paused || self.is_finished() {
            return Ok(Vec::new());
        }
        let before = self.engine.events().len();
        while !self.is_finished() && self.pending.is_none() {
            // A challenge window left open across a reload is settled first.
            if self.engine.challenge_seat().is_some() {
                self.settle_challenge()?;
                continue;
            }
            let Some(current) = self.engine.current_player() else {
                break;
            };
            if self.engine.active_rank().is_none() {
                if current == self.human_index {
                    self.suspend(DecisionKind::SelectRank, current);
                    break;
                }
                let hand = self.engine.state().players[current].hand.clone();
                let view = self.engine.public_view();
                let bot = self.bot_mut(current)?;
                let rank = bot.choose_active_rank(&hand, &view);
                self.engine.select_active_rank(current, rank)?;
            }
            if current == self.human_index {
                self.suspend(DecisionKind::Play, current);
                break;
            }
            let hand = self.engine.state().players[current].hand.clone();
            let view = self.engine.public_view();
            let bot = self.bot_mut(current)?;
            let (cards, claim) = bot.choose_play(&hand, &view);
            self.engine.play(current, &cards, claim)?;
            self.settle_challenge()?;
        }
        Ok(self.engine.events()[before..].to_vec())
    }

    /// Inject the human decision the loop is suspended on. Validates the
    /// action kind against the pending slot and routes it through the
    /// engine's own legality checks. Does not resume the bot loop; call
    /// [`GameSession::step`] afterwards.
    pub fn apply_action(&mut self, action: Action) -> Result<Vec<Event>, SessionError> {
        if self.paused {
            return Err(SessionError::GamePaused);
        }
        if self.is_finished() {
            return Err(SessionError::GameFinished);
        }
        let before = self.engine.events().len();
        match action {
            Action::SelectRank { rank } => {
                let pending = self.expect_pending(DecisionKind::SelectRank)?;
                self.engine.select_active_rank(pending.player, rank)?;
                // The same seat now owes the play for the rank it picked.
                self.pending = Some(PendingDecision {
                    kind: DecisionKind::Play,
                    player: pending.player,
                });
            }
            Action::Play { cards } => {
                let pending = self.expect_pending(DecisionKind::Play)?;
                if self.engine.current_player() != Some(pending.player) {
                    return Err(SessionError::NotYourTurn {
                        seat: pending.player,
                    });
                }
                let claim = self
                    .engine
                    .active_rank()
                    .ok_or(cheat_engine::errors::GameError::RankNotSelected)?;
                self.engine.play(pending.player, &cards, claim)?;
                self.pending = None;
                self.settle_challenge()?;
            }
            Action::Challenge { value } => {
                let pending = self.expect_pending(DecisionKind::Challenge)?;
                self.engine.decide_challenge(pending.player, value)?;
                self.pending = None;
            }
        }
        Ok(self.engine.events()[before..].to_vec())
    }

    /// Resolve the open challenge window: suspend when the challenger is the
    /// human seat, otherwise ask the challenger's bot and decide at once.
    fn settle_challenge(&mut self) -> Result<(), SessionError> {
        let Some(challenger) = self.engine.challenge_seat() else {
            return Ok(());
        };
        if challenger == self.human_index {
            self.suspend(DecisionKind::Challenge, challenger);
            return Ok(());
        }
        let hand = self.engine.state().players[challenger].hand.clone();
        let view = self.engine.challenge_view();
        let bot = self.bot_mut(challenger)?;
        let decision = bot.should_challenge(&hand, &view);
        let eval = bot.last_challenge_eval();
        if let Some(message) = eval {
            self.engine.record_challenge_eval(challenger, message);
        }
        self.engine.decide_challenge(challenger, decision)?;
        Ok(())
    }

    fn suspend(&mut self, kind: DecisionKind, player: usize) {
        debug!(session_id = %self.session_id, %kind, player, "suspending for human decision");
        self.pending = Some(PendingDecision { kind, player });
    }

    fn expect_pending(&self, kind: DecisionKind) -> Result<PendingDecision, SessionError> {
        match self.pending {
            Some(pending) if pending.kind == kind => Ok(pending),
            other => Err(SessionError::UnexpectedAction {
                expected: other.map(|p| p.kind),
                got: kind,
            }),
        }
    }

    fn bot_mut(&mut self, seat: usize) -> Result<&mut Bot, SessionError> {
        self.bots
            .get_mut(seat)
            .and_then(Option::as_mut)
            .ok_or(SessionError::MissingBot(seat))
    }

    /// Serialize the complete session, bot generator states included.
    pub fn to_save(&self) -> Result<SessionSave, SessionError> {
        let bot_rng_states = self
            .bots
            .iter()
            .map(|bot| bot.as_ref().map(Bot::rng_state).transpose())
            .collect::<Result<Vec<_>, _>>()?;
        let recorder = self.engine.recorder();
        Ok(SessionSave {
            version: SAVE_VERSION,
            session_id: self.session_id.clone(),
            seed: self.seed,
            human_index: self.human_index,
            bot_types: self.bot_kinds.clone(),
            state: self.engine.state().clone(),
            pending_decision: self.pending,
            last_played_cards: self.engine.last_played_cards().to_vec(),
            last_played_player: self.engine.last_played_player(),
            bot_rng_states,
            recorder: RecorderSave {
                metadata: recorder.metadata().clone(),
                initial_state: recorder.initial_state().cloned(),
                events: recorder.events().to_vec(),
                snapshot_interval: recorder.snapshot_interval(),
            },
            paused: self.paused,
            finished: self.is_finished(),
        })
    }

    /// Reconstruct a session whose subsequent behavior is indistinguishable
    /// from the one that was saved.
    pub fn from_save(save: SessionSave) -> Result<Self, SessionError> {
        if save.version != SAVE_VERSION {
            return Err(SessionError::UnsupportedSaveVersion(save.version));
        }
        validate_seats(save.human_index, &save.bot_types)?;
        let mut bots = spawn_bots(&save.bot_types, save.seed);
        for (bot, state) in bots.iter_mut().zip(&save.bot_rng_states) {
            if let (Some(bot), Some(state)) = (bot.as_mut(), state.as_ref()) {
                bot.restore_rng_state(state)?;
            }
        }
        let recorder = ReplayRecorder::from_parts(
            save.recorder.metadata,
            save.recorder.initial_state,
            save.recorder.events,
            save.recorder.snapshot_interval,
        );
        // Only an in-flight human challenge survives a save; bot challenges
        // are always settled within the same step call.
        let pending_challenger = save
            .pending_decision
            .filter(|p| p.kind == DecisionKind::Challenge)
            .map(|p| p.player);
        let engine = Engine::from_parts(
            save.state,
            recorder,
            save.last_played_cards,
            save.last_played_player,
            pending_challenger,
            save.finished,
        );
        info!(session_id = %save.session_id, "session restored");
        Ok(Self {
            session_id: save.session_id,
            seed: save.seed,
            human_index: save.human_index,
            bot_kinds: save.bot_types,
            engine,
            bots,
            pending: save.pending_decision,
            paused: save.paused,
            replay_saved: false,
        })
    }

    /// Write the finished game's replay document to
    /// `<dir>/interactive_<session-id>.json`, once. Returns `None` while the
    /// game is still running or when the replay was already written.
    pub fn save_replay(&mut self, dir: &Path) -> Result<Option<PathBuf>, SessionError> {
        if !self.is_finished() || self.replay_saved {
            return Ok(None);
        }
        let replay = self.engine.recorder().build_replay()?;
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("interactive_{}.json", self.session_id));
        let json = serde_json::to_string_pretty(&replay)?;
        fs::write(&path, json)?;
        self.replay_saved = true;
        info!(session_id = %self.session_id, path = %path.display(), "replay written");
        Ok(Some(path))
    }
}

fn validate_seats(human_index: usize, kinds: &[BotKind]) -> Result<(), SessionError> {
    if !(2..=6).contains(&kinds.len()) {
        return Err(SessionError::InvalidSeats(format!(
            "expected 2-6 seats, got {}",
            kinds.len()
        )));
    }
    if human_index >= kinds.len() {
        return Err(SessionError::InvalidSeats(format!(
            "human index {human_index} out of range"
        )));
    }
    for (idx, kind) in kinds.iter().enumerate() {
        let is_human_slot = idx == human_index;
        if is_human_slot && *kind != BotKind::Human {
            return Err(SessionError::InvalidSeats(format!(
                "seat {idx} is the human seat but is configured as {kind}"
            )));
        }
        if !is_human_slot && *kind == BotKind::Human {
            return Err(SessionError::InvalidSeats(format!(
                "seat {idx} is configured as human but seat {human_index} is the human seat"
            )));
        }
    }
    Ok(())
}
