//! Sim command handler: batch bot-vs-bot games with aggregate statistics.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rand::SeedableRng;

use cheat_bots::{spawn_table, BotKind};
use cheat_engine::engine::Engine;
use cheat_engine::replay::DEFAULT_SNAPSHOT_INTERVAL;

use crate::error::CliError;
use crate::ui;

#[derive(Default)]
struct Tally {
    wins: BTreeMap<String, u64>,
    game_lengths: Vec<u64>,
    pickup_sizes: Vec<usize>,
    placements: BTreeMap<usize, BTreeMap<String, u64>>,
    challenge_opps: BTreeMap<String, u64>,
    challenge_attempts: BTreeMap<String, u64>,
    challenge_success: BTreeMap<String, u64>,
}

/// Handle the sim command: run `games` independent games and print the
/// aggregate summary.
///
/// Per-game seeds are drawn from a master ChaCha20 stream seeded by `seed`,
/// so a fixed `--seed` reproduces the whole batch. Replays are written to
/// `save_replay` when given, one file per game.
pub fn handle_sim_command(
    players: usize,
    bots: Vec<String>,
    seed: Option<u64>,
    games: u32,
    verbose: bool,
    save_replay: Option<String>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if !(2..=6).contains(&players) {
        ui::write_error(err, "players must be between 2 and 6")?;
        return Err(CliError::InvalidInput(
            "players must be between 2 and 6".to_string(),
        ));
    }
    if games == 0 {
        ui::write_error(err, "games must be >= 1")?;
        return Err(CliError::InvalidInput("games must be >= 1".to_string()));
    }
    let kinds = roster(players, &bots)?;
    let names: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();

    let master_seed = seed.unwrap_or_else(rand::random);
    let mut master = ChaCha20Rng::seed_from_u64(master_seed);
    let mut tally = Tally::default();

    for game_idx in 0..games {
        let game_seed: u64 = master.random_range(0..=1_000_000);
        let mut table = spawn_table(&kinds, Some(game_seed))
            .map_err(|e| CliError::InvalidInput(e.to_string()))?;
        let mut engine = Engine::new(Some(game_seed), &names, DEFAULT_SNAPSHOT_INTERVAL)?;
        engine.run(&mut table)?;

        if let Some(base) = save_replay.as_deref() {
            let replay = engine.recorder().build_replay()?;
            let path = replay_path(base, game_idx, games);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&path, serde_json::to_string_pretty(&replay)?)?;
        }

        let state = engine.state();
        if verbose {
            writeln!(out, "=== Game {} ===", game_idx + 1)?;
            for event in &state.log {
                writeln!(out, "{}", event.message)?;
            }
            writeln!(out, "Placements: {:?}", state.placements)?;
        }

        let winner = state.placements.first().copied().ok_or_else(|| {
            CliError::Engine("finished game has no placements".to_string())
        })?;
        *tally
            .wins
            .entry(state.players[winner].bot.clone())
            .or_default() += 1;
        tally.game_lengths.push(u64::from(state.turn_count));
        tally.pickup_sizes.extend(state.pile_pickups.iter().copied());
        for (place, &player) in state.placements.iter().enumerate() {
            *tally
                .placements
                .entry(place + 1)
                .or_default()
                .entry(state.players[player].bot.clone())
                .or_default() += 1;
        }
        for (name, stats) in &state.challenge_stats {
            *tally.challenge_opps.entry(name.clone()).or_default() +=
                u64::from(stats.opportunities);
            *tally.challenge_attempts.entry(name.clone()).or_default() +=
                u64::from(stats.attempts);
            *tally.challenge_success.entry(name.clone()).or_default() +=
                u64::from(stats.success);
        }
    }

    print_summary(&tally, out)?;
    Ok(())
}

/// Parse the seat roster: cycle the given bot names to fill the table,
/// defaulting to all-random. Human seats are not allowed here.
fn roster(players: usize, bots: &[String]) -> Result<Vec<BotKind>, CliError> {
    let names: Vec<&str> = if bots.is_empty() {
        vec!["random"; players]
    } else {
        bots.iter().map(String::as_str).cycle().take(players).collect()
    };
    let mut kinds = Vec::with_capacity(players);
    for name in names {
        let kind: BotKind = name
            .parse()
            .map_err(|e: cheat_bots::BotError| CliError::InvalidInput(e.to_string()))?;
        if kind == BotKind::Human {
            return Err(CliError::InvalidInput(
                "human seats are not allowed in sim; use the play command".to_string(),
            ));
        }
        kinds.push(kind);
    }
    Ok(kinds)
}

fn replay_path(base: &str, game_idx: u32, total_games: u32) -> PathBuf {
    let path = Path::new(base);
    if total_games <= 1 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|s| format!(".{}", s.to_string_lossy()))
        .unwrap_or_default();
    path.with_file_name(format!("{}_game{}{}", stem, game_idx + 1, ext))
}

fn print_summary(tally: &Tally, out: &mut dyn Write) -> Result<(), CliError> {
    writeln!(out, "=== Summary ===")?;
    for (name, count) in &tally.wins {
        writeln!(out, "Wins ({}): {}", name, count)?;
    }
    if !tally.game_lengths.is_empty() {
        let avg = tally.game_lengths.iter().sum::<u64>() as f64
            / tally.game_lengths.len() as f64;
        writeln!(out, "Average game length (turns): {:.2}", avg)?;
    }
    if tally.pickup_sizes.is_empty() {
        writeln!(out, "Average pile pickup size: 0.00")?;
    } else {
        let avg = tally.pickup_sizes.iter().sum::<usize>() as f64
            / tally.pickup_sizes.len() as f64;
        writeln!(out, "Average pile pickup size: {:.2}", avg)?;
    }
    writeln!(out, "Placement distribution:")?;
    for (place, entries) in &tally.placements {
        let line = entries
            .iter()
            .map(|(name, count)| format!("{}: {}", name, count))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "  Place {}: {}", place, line)?;
    }
    writeln!(out, "Challenge rates:")?;
    for (name, &opps) in &tally.challenge_opps {
        let attempts = tally.challenge_attempts.get(name).copied().unwrap_or(0);
        let success = tally.challenge_success.get(name).copied().unwrap_or(0);
        let rate = if opps > 0 {
            attempts as f64 / opps as f64
        } else {
            0.0
        };
        let success_rate = if attempts > 0 {
            success as f64 / attempts as f64
        } else {
            0.0
        };
        writeln!(
            out,
            "  {}: {}/{} ({:.2}%) challenges, success {:.2}%",
            name,
            attempts,
            opps,
            rate * 100.0,
            success_rate * 100.0
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_path_plain_for_single_game() {
        assert_eq!(
            replay_path("out/replay.json", 0, 1),
            PathBuf::from("out/replay.json")
        );
    }

    #[test]
    fn replay_path_suffixed_for_batches() {
        assert_eq!(
            replay_path("out/replay.json", 2, 5),
            PathBuf::from("out/replay_game3.json")
        );
    }

    #[test]
    fn roster_cycles_bot_names() {
        let kinds = roster(4, &["random".to_string(), "heuristic".to_string()]).unwrap();
        assert_eq!(
            kinds,
            vec![
                BotKind::Random,
                BotKind::Heuristic,
                BotKind::Random,
                BotKind::Heuristic
            ]
        );
    }

    #[test]
    fn roster_rejects_human_seats() {
        assert!(roster(2, &["human".to_string()]).is_err());
    }
}
