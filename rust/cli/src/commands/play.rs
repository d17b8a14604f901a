//! Play command handler: interactive terminal game against bots.
//!
//! The human always sits at seat 0. At any prompt, `save` writes the session
//! to the `--save` path and exits; `quit` (or EOF) exits without saving.

use std::io::{BufRead, Write};
use std::path::Path;

use cheat_bots::BotKind;
use cheat_engine::cards::{Card, Rank};
use cheat_session::{Action, DecisionKind, GameSession, SessionError};

use crate::error::CliError;
use crate::io_utils::read_stdin_line;
use crate::ui;

enum Prompted {
    Action(Action),
    Save,
    Quit,
}

pub fn handle_play_command(
    players: usize,
    bots: Vec<String>,
    seed: Option<u64>,
    load: Option<String>,
    save: Option<String>,
    replay_dir: Option<String>,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<(), CliError> {
    let mut session = match load {
        Some(path) => {
            let content = std::fs::read_to_string(&path)?;
            let saved = serde_json::from_str(&content)?;
            let mut session = GameSession::from_save(saved)?;
            session.set_paused(false);
            writeln!(out, "Resumed session {}", session.session_id())?;
            session
        }
        None => {
            let kinds = roster(players, &bots)?;
            GameSession::new(0, kinds, seed)?
        }
    };

    // On resume, skip narration that was already shown before the save.
    let mut log_cursor = session.state().log.len();

    loop {
        session.step()?;
        flush_log(&session, &mut log_cursor, out)?;
        if session.is_finished() {
            break;
        }
        let Some(pending) = session.pending_decision() else {
            continue;
        };
        print_view(&session, out)?;
        let prompted = match pending.kind {
            DecisionKind::SelectRank => prompt_rank(out, stdin)?,
            DecisionKind::Play => prompt_cards(out, stdin)?,
            DecisionKind::Challenge => prompt_challenge(out, stdin)?,
        };
        let action = match prompted {
            Prompted::Action(action) => action,
            Prompted::Save => {
                let Some(path) = save.as_deref() else {
                    ui::display_warning(err, "no --save path given; staying in the game")?;
                    continue;
                };
                session.set_paused(true);
                let saved = session.to_save()?;
                if let Some(parent) = Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                std::fs::write(path, serde_json::to_string_pretty(&saved)?)?;
                writeln!(out, "Session saved to {}", path)?;
                return Ok(());
            }
            Prompted::Quit => {
                writeln!(out, "Exiting without saving.")?;
                return Ok(());
            }
        };
        match session.apply_action(action) {
            Ok(_) => flush_log(&session, &mut log_cursor, out)?,
            Err(SessionError::Game(e)) => ui::write_error(err, &e.to_string())?,
            Err(e) => return Err(e.into()),
        }
    }

    writeln!(out, "Game over!")?;
    let state = session.state();
    for (place, &player) in state.placements.iter().enumerate() {
        let you = if player == session.human_index() {
            " (you)"
        } else {
            ""
        };
        writeln!(
            out,
            "  Place {}: seat {} [{}]{}",
            place + 1,
            player,
            state.players[player].bot,
            you
        )?;
    }
    if let Some(dir) = replay_dir {
        if let Some(path) = session.save_replay(Path::new(&dir))? {
            writeln!(out, "Replay written to {}", path.display())?;
        }
    }
    Ok(())
}

/// Human at seat 0, cycled bot types for the rest (default: all random).
fn roster(players: usize, bots: &[String]) -> Result<Vec<BotKind>, CliError> {
    if !(2..=6).contains(&players) {
        return Err(CliError::InvalidInput(
            "players must be between 2 and 6".to_string(),
        ));
    }
    let mut kinds = vec![BotKind::Human];
    let names: Vec<&str> = if bots.is_empty() {
        vec!["random"; players - 1]
    } else {
        bots.iter()
            .map(String::as_str)
            .cycle()
            .take(players - 1)
            .collect()
    };
    for name in names {
        let kind: BotKind = name
            .parse()
            .map_err(|e: cheat_bots::BotError| CliError::InvalidInput(e.to_string()))?;
        if kind == BotKind::Human {
            return Err(CliError::InvalidInput(
                "only seat 0 can be human".to_string(),
            ));
        }
        kinds.push(kind);
    }
    Ok(kinds)
}

fn flush_log(
    session: &GameSession,
    cursor: &mut usize,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let log = &session.state().log;
    for event in &log[*cursor..] {
        writeln!(out, "{}", event.message)?;
    }
    *cursor = log.len();
    Ok(())
}

fn print_view(session: &GameSession, out: &mut dyn Write) -> Result<(), CliError> {
    let state = session.state();
    let rank = state
        .active_rank
        .map(|r| r.symbol().to_string())
        .unwrap_or_else(|| "-".to_string());
    writeln!(out, "--- Turn {} ---", state.turn_count)?;
    writeln!(
        out,
        "Active rank: {}  Pile: {} cards",
        rank,
        state.pile.len()
    )?;
    let hands = state
        .players
        .iter()
        .enumerate()
        .map(|(idx, p)| format!("seat{}={}", idx, p.hand.len()))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "Hands: {}", hands)?;
    let hand = &state.players[session.human_index()].hand;
    let tokens = hand
        .iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(out, "Your hand: {}", tokens)?;
    Ok(())
}

fn prompt_rank(out: &mut dyn Write, stdin: &mut dyn BufRead) -> Result<Prompted, CliError> {
    loop {
        writeln!(out, "Choose a rank to claim (2-10, J, Q, K, A):")?;
        let Some(line) = read_stdin_line(stdin) else {
            return Ok(Prompted::Quit);
        };
        match line.as_str() {
            "save" => return Ok(Prompted::Save),
            "quit" => return Ok(Prompted::Quit),
            other => match other.parse::<Rank>() {
                Ok(rank) => return Ok(Prompted::Action(Action::SelectRank { rank })),
                Err(e) => writeln!(out, "{}", e)?,
            },
        }
    }
}

fn prompt_cards(out: &mut dyn Write, stdin: &mut dyn BufRead) -> Result<Prompted, CliError> {
    loop {
        writeln!(out, "Enter 1-3 cards to play (e.g. 10♥ A♠):")?;
        let Some(line) = read_stdin_line(stdin) else {
            return Ok(Prompted::Quit);
        };
        match line.as_str() {
            "save" => return Ok(Prompted::Save),
            "quit" => return Ok(Prompted::Quit),
            other => {
                let parsed: Result<Vec<Card>, _> =
                    other.split_whitespace().map(str::parse).collect();
                match parsed {
                    Ok(cards) if !cards.is_empty() => {
                        return Ok(Prompted::Action(Action::Play { cards }));
                    }
                    Ok(_) => writeln!(out, "enter at least one card")?,
                    Err(e) => writeln!(out, "{}", e)?,
                }
            }
        }
    }
}

fn prompt_challenge(out: &mut dyn Write, stdin: &mut dyn BufRead) -> Result<Prompted, CliError> {
    loop {
        writeln!(out, "Challenge the last claim? [y/N]:")?;
        let Some(line) = read_stdin_line(stdin) else {
            return Ok(Prompted::Quit);
        };
        match line.to_ascii_lowercase().as_str() {
            "save" => return Ok(Prompted::Save),
            "quit" => return Ok(Prompted::Quit),
            "y" | "yes" => return Ok(Prompted::Action(Action::Challenge { value: true })),
            "" | "n" | "no" => return Ok(Prompted::Action(Action::Challenge { value: false })),
            _ => writeln!(out, "please answer y or n")?,
        }
    }
}
