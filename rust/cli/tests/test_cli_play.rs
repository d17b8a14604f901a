use std::io::Cursor;

use cheat_session::SessionSave;

fn run_play(args: &[&str], input: &str) -> (i32, String, String) {
    let mut stdin = Cursor::new(input.as_bytes().to_vec());
    let mut out = Cursor::new(Vec::new());
    let mut err = Cursor::new(Vec::new());
    let code = cheat_cli::run_with_input(args.iter().copied(), &mut stdin, &mut out, &mut err);
    (
        code,
        String::from_utf8(out.into_inner()).unwrap(),
        String::from_utf8(err.into_inner()).unwrap(),
    )
}

#[test]
fn play_prompts_for_a_rank_and_quits_cleanly() {
    let (code, out, _) = run_play(
        &["cheat", "play", "--players", "2", "--seed", "5"],
        "quit\n",
    );
    assert_eq!(code, 0);
    assert!(out.contains("Your hand:"));
    assert!(out.contains("Choose a rank to claim"));
    assert!(out.contains("Exiting without saving."));
}

#[test]
fn play_moves_from_rank_selection_to_the_play_prompt() {
    let (code, out, _) = run_play(
        &["cheat", "play", "--players", "2", "--seed", "5"],
        "2\nquit\n",
    );
    assert_eq!(code, 0);
    assert!(out.contains("Enter 1-3 cards to play"));
}

#[test]
fn play_reprompts_on_garbage_input() {
    let (code, out, _) = run_play(
        &["cheat", "play", "--players", "2", "--seed", "5"],
        "fifteen\n2\nquit\n",
    );
    assert_eq!(code, 0);
    assert!(out.contains("invalid card rank: fifteen"));
    assert!(out.contains("Enter 1-3 cards to play"));
}

#[test]
fn eof_exits_without_error() {
    let (code, _, _) = run_play(&["cheat", "play", "--players", "2", "--seed", "5"], "");
    assert_eq!(code, 0);
}

#[test]
fn save_requires_a_target_path() {
    let (code, _, err) = run_play(
        &["cheat", "play", "--players", "2", "--seed", "5"],
        "save\nquit\n",
    );
    assert_eq!(code, 0);
    assert!(err.contains("no --save path given"));
}

#[test]
fn save_then_load_resumes_the_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let save_path = dir.path().join("session.json");
    let save_arg = save_path.to_str().unwrap();

    let (code, out, _) = run_play(
        &[
            "cheat", "play", "--players", "2", "--seed", "5", "--save", save_arg,
        ],
        "save\n",
    );
    assert_eq!(code, 0);
    assert!(out.contains("Session saved to"));

    let saved: SessionSave =
        serde_json::from_str(&std::fs::read_to_string(&save_path).unwrap()).expect("valid save");
    assert!(saved.paused);
    assert_eq!(saved.human_index, 0);

    let (code, out, _) = run_play(
        &["cheat", "play", "--load", save_arg],
        "quit\n",
    );
    assert_eq!(code, 0);
    assert!(out.contains("Resumed session"));
    assert!(out.contains("Choose a rank to claim"));
}

#[test]
fn play_rejects_a_bad_roster() {
    let (code, _, err) = run_play(
        &["cheat", "play", "--players", "2", "--bots", "human"],
        "",
    );
    assert_eq!(code, 2);
    assert!(err.contains("only seat 0 can be human"));
}
