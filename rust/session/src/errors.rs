use thiserror::Error;

use cheat_engine::errors::{GameError, ReplayError};

use crate::session::DecisionKind;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not expecting a {got} action right now (pending: {expected:?})")]
    UnexpectedAction {
        expected: Option<DecisionKind>,
        got: DecisionKind,
    },
    #[error("it is not seat {seat}'s turn")]
    NotYourTurn { seat: usize },
    #[error("game is paused")]
    GamePaused,
    #[error("game already finished")]
    GameFinished,
    #[error("seat {0} has no bot policy")]
    MissingBot(usize),
    #[error("invalid seat configuration: {0}")]
    InvalidSeats(String),
    #[error("unsupported save version: {0}")]
    UnsupportedSaveVersion(u32),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error("serialization: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
