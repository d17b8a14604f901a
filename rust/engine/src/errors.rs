use thiserror::Error;

use crate::cards::{Card, Rank};

/// Rule violations raised by the turn state machine. These indicate a
/// defective policy or external action; the offending operation is aborted
/// without mutating game state and is never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("num_players must be between 2 and 6, got {0}")]
    InvalidPlayerCount(usize),
    #[error("seat {0} does not exist")]
    SeatOutOfRange(usize),
    #[error("it's not seat {actual}'s turn (expected seat {expected})")]
    NotPlayersTurn { expected: usize, actual: usize },
    #[error("game already finished")]
    GameOver,
    #[error("active rank already set")]
    RankAlreadySet,
    #[error("active rank must be selected before playing")]
    RankNotSelected,
    #[error("claimed rank {claimed} must match active rank {active}")]
    ClaimMismatch { claimed: Rank, active: Rank },
    #[error("must play 1-3 cards, got {count}")]
    InvalidPlaySize { count: usize },
    #[error("card {card} is not in seat {seat}'s hand")]
    CardNotInHand { seat: usize, card: Card },
    #[error("a challenge decision is pending")]
    ChallengePending,
    #[error("no challenge decision is pending")]
    NoChallengePending,
    #[error("expected one bot per seat ({seats} seats, {bots} bots)")]
    BotCountMismatch { seats: usize, bots: usize },
}

/// Decode and reconstruction failures for replay logs. The validator
/// accumulates these as text instead of aborting; everything else surfaces
/// them to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("invalid card token: {0}")]
    InvalidCardToken(String),
    #[error("invalid card rank: {0}")]
    IllegalRank(String),
    #[error("unknown event type: {0}")]
    UnknownEventType(String),
    #[error("malformed event: {0}")]
    MalformedEvent(String),
    #[error("player {0} out of range")]
    PlayerOutOfRange(usize),
    #[error("card {card} missing from player {player}'s hand")]
    CardNotInHand { player: usize, card: Card },
    #[error("initial state not set")]
    MissingInitialState,
}
