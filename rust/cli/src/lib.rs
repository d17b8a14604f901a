//! # Cheat CLI Library
//!
//! Command-line interface for the cheat game engine: batch simulation,
//! interactive play, and replay tooling.
//!
//! The primary entry point is the [`run`] function, which parses arguments
//! and dispatches to the subcommand handlers with injected output streams,
//! so tests can drive the whole binary through buffers.
//!
//! ## Available Subcommands
//!
//! - `sim`: run bot-vs-bot games and print aggregate statistics
//! - `play`: play an interactive game from the terminal
//! - `verify`: validate a replay document's integrity
//! - `replay`: reduce a recorded log and print the reconstructed state

use std::io::Write;

pub mod cli;
mod commands;
mod error;
pub mod exit_code;
pub mod io_utils;
pub mod ui;

use cli::{CheatCli, Commands};
use clap::Parser;
use commands::{
    handle_play_command, handle_replay_command, handle_sim_command, handle_verify_command,
};

pub use error::CliError;

/// Parse `args` and execute the selected subcommand.
///
/// Returns the process exit code: `0` on success, `2` on any error. Help and
/// version requests print to `out` and exit 0; all other parse failures go
/// to `err` and exit 2.
///
/// ```no_run
/// use std::io;
/// let args = vec!["cheat", "sim", "--players", "2", "--seed", "7"];
/// let code = cheat_cli::run(args, &mut io::stdout(), &mut io::stderr());
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
    let parsed = CheatCli::try_parse_from(&argv);
    let cli = match parsed {
        Err(e) => {
            use clap::error::ErrorKind;
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::SUCCESS
                }
                _ => {
                    if writeln!(err, "{}", e).is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::ERROR
                }
            };
        }
        Ok(cli) => cli,
    };

    let result = match cli.cmd {
        Commands::Sim {
            players,
            bots,
            seed,
            games,
            verbose,
            save_replay,
        } => handle_sim_command(players, bots, seed, games, verbose, save_replay, out, err),
        Commands::Play {
            players,
            bots,
            seed,
            load,
            save,
            replay_dir,
        } => {
            let stdin = std::io::stdin();
            let mut stdin_lock = stdin.lock();
            handle_play_command(
                players,
                bots,
                seed,
                load,
                save,
                replay_dir,
                out,
                err,
                &mut stdin_lock,
            )
        }
        Commands::Verify { input } => handle_verify_command(input, out, err),
        Commands::Replay { input, upto } => handle_replay_command(input, upto, out, err),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            if writeln!(err, "Error: {}", e).is_err() {
                return exit_code::ERROR;
            }
            exit_code::ERROR
        }
    }
}

/// Variant of [`run`] with an injectable stdin, used by interactive-play
/// tests to script human decisions.
pub fn run_with_input<I, S>(
    args: I,
    stdin: &mut dyn std::io::BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
    let cli = match CheatCli::try_parse_from(&argv) {
        Err(e) => {
            let _ = writeln!(err, "{}", e);
            return exit_code::ERROR;
        }
        Ok(cli) => cli,
    };
    let result = match cli.cmd {
        Commands::Play {
            players,
            bots,
            seed,
            load,
            save,
            replay_dir,
        } => handle_play_command(players, bots, seed, load, save, replay_dir, out, err, stdin),
        _ => {
            let _ = writeln!(err, "run_with_input only supports the play command");
            return exit_code::ERROR;
        }
    };
    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            let _ = writeln!(err, "Error: {}", e);
            exit_code::ERROR
        }
    }
}
