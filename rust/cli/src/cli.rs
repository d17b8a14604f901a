//! Command-line argument definitions for the `cheat` binary.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cheat", version, about = "Cheat (bluffing card game) simulator")]
pub struct CheatCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run batch games between bots and print aggregate statistics
    Sim {
        /// Number of players (2-6)
        #[arg(long, default_value_t = 4)]
        players: usize,
        /// Bot types per seat (random, heuristic); repeated to fill the table
        #[arg(long, num_args = 0..)]
        bots: Vec<String>,
        /// Master RNG seed; random when omitted
        #[arg(long)]
        seed: Option<u64>,
        /// Number of games to run
        #[arg(long, default_value_t = 1)]
        games: u32,
        /// Verbose turn-by-turn log
        #[arg(long)]
        verbose: bool,
        /// Path to save replay JSON (suffixed _gameK when --games > 1)
        #[arg(long)]
        save_replay: Option<String>,
    },
    /// Play an interactive game from the terminal (you are seat 0)
    Play {
        /// Number of players (2-6)
        #[arg(long, default_value_t = 2)]
        players: usize,
        /// Bot types for the non-human seats
        #[arg(long, num_args = 0..)]
        bots: Vec<String>,
        /// RNG seed; random when omitted
        #[arg(long)]
        seed: Option<u64>,
        /// Resume a previously saved session
        #[arg(long)]
        load: Option<String>,
        /// Where to write the session when you type `save` at a prompt
        #[arg(long)]
        save: Option<String>,
        /// Directory to write the finished game's replay into
        #[arg(long)]
        replay_dir: Option<String>,
    },
    /// Validate a replay document and print diagnostics
    Verify {
        /// Path to replay JSON file
        #[arg(long)]
        input: String,
    },
    /// Reduce a replay log and print the reconstructed state
    Replay {
        /// Path to replay JSON file
        #[arg(long)]
        input: String,
        /// Stop after this many events
        #[arg(long)]
        upto: Option<usize>,
    },
}
