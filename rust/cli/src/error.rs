//! Error type shared by the CLI command handlers.

use std::fmt;

use cheat_engine::errors::{GameError, ReplayError};
use cheat_session::SessionError;

/// Errors a command handler can surface. Every variant maps to exit code 2
/// in [`crate::run`].
#[derive(Debug)]
pub enum CliError {
    /// I/O failure (file operations, stdout/stderr writes)
    Io(std::io::Error),
    /// Invalid command-line arguments or user input
    InvalidInput(String),
    /// Rule or replay failure reported by the engine
    Engine(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Engine(msg) => write!(f, "Engine error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<GameError> for CliError {
    fn from(error: GameError) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl From<ReplayError> for CliError {
    fn from(error: ReplayError) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl From<SessionError> for CliError {
    fn from(error: SessionError) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        CliError::InvalidInput(format!("malformed JSON: {}", error))
    }
}
