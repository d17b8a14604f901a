//! Command handler modules for the cheat CLI.
//!
//! One module per subcommand, each exposing
//! `pub fn handle_COMMAND_command(...) -> Result<(), CliError>` with output
//! streams passed in for testability.

pub mod play;
pub mod replay;
pub mod sim;
pub mod verify;

pub use play::handle_play_command;
pub use replay::handle_replay_command;
pub use sim::handle_sim_command;
pub use verify::handle_verify_command;
