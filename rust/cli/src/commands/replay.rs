//! Replay command handler: reduce a recorded log and print the result.

use std::io::Write;

use cheat_engine::replay::{reduce, Replay};

use crate::error::CliError;

/// Handle the replay command: rebuild the game state from a replay document,
/// optionally stopping after `upto` events, and print a summary.
pub fn handle_replay_command(
    input: String,
    upto: Option<usize>,
    out: &mut dyn Write,
    _err: &mut dyn Write,
) -> Result<(), CliError> {
    let content = std::fs::read_to_string(&input)?;
    let replay: Replay = serde_json::from_str(&content)?;
    let applied = upto.unwrap_or(replay.events.len()).min(replay.events.len());
    let state = reduce(&replay, upto)?;

    writeln!(out, "Replay: {}", input)?;
    writeln!(
        out,
        "Seed: {}  Players: {}  Events: {} (applied {})",
        replay
            .metadata
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string()),
        replay.metadata.player_count,
        replay.events.len(),
        applied
    )?;
    for (idx, player) in state.players.iter().enumerate() {
        let placement = player
            .placement
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "Seat {} [{}]: {} cards, {} discarded, placement {}",
            idx,
            player.bot,
            player.hand.len(),
            player.discarded.len(),
            placement
        )?;
    }
    writeln!(
        out,
        "Active rank: {}  Pile: {} cards",
        state
            .active_rank
            .map(|r| r.symbol().to_string())
            .unwrap_or_else(|| "-".to_string()),
        state.pile.len()
    )?;
    writeln!(
        out,
        "Current player: {}",
        state
            .current_player
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string())
    )?;
    writeln!(out, "Placements: {:?}", state.placements)?;
    Ok(())
}
