use cheat_bots::{spawn_bots, BotKind};
use cheat_engine::cards::Rank;
use cheat_engine::errors::GameError;
use cheat_engine::game::{GameState, PlayerState};
use cheat_engine::replay::{build_metadata, Event, Replay, ReplayState};
use cheat_session::{
    Action, DecisionKind, GameSession, RecorderSave, SessionError, SessionSave, SAVE_VERSION,
};

fn new_session(human_index: usize, kinds: &[BotKind], seed: u64) -> GameSession {
    GameSession::new(human_index, kinds.to_vec(), Some(seed)).expect("valid session")
}

/// Scripted human: claim twos, shed the first card, never challenge.
/// Mirrors how a front end drives the session one decision at a time.
fn advance(session: &mut GameSession) {
    match session.pending_decision() {
        None => {
            session.step().expect("step");
            return;
        }
        Some(pending) => match pending.kind {
            DecisionKind::SelectRank => {
                session
                    .apply_action(Action::SelectRank { rank: Rank::Two })
                    .expect("select rank");
            }
            DecisionKind::Play => {
                let card = session.state().players[session.human_index()].hand[0];
                session
                    .apply_action(Action::Play { cards: vec![card] })
                    .expect("play");
            }
            DecisionKind::Challenge => {
                session
                    .apply_action(Action::Challenge { value: false })
                    .expect("challenge");
            }
        },
    }
    session.step().expect("step");
}

#[test]
fn step_halts_for_the_human_decision() {
    let mut session = new_session(1, &[BotKind::Random, BotKind::Human, BotKind::Random], 42);
    let events = session.step().expect("step");
    assert!(!events.is_empty());

    // Seat 0 opened the round, so the human at seat 1 owes the challenge.
    let pending = session.pending_decision().expect("suspended");
    assert_eq!(pending.kind, DecisionKind::Challenge);
    assert_eq!(pending.player, 1);

    // The loop stays suspended until the decision arrives.
    assert!(session.step().expect("step").is_empty());
    assert_eq!(
        session.pending_decision().map(|p| p.kind),
        Some(DecisionKind::Challenge)
    );
}

#[test]
fn select_rank_then_play_uses_one_pending_slot() {
    let mut session = new_session(0, &[BotKind::Human, BotKind::Random], 5);
    session.step().expect("step");
    assert_eq!(
        session.pending_decision().map(|p| p.kind),
        Some(DecisionKind::SelectRank)
    );

    session
        .apply_action(Action::SelectRank { rank: Rank::King })
        .expect("select rank");
    // The same seat immediately owes the play for the rank it picked.
    let pending = session.pending_decision().expect("still suspended");
    assert_eq!(pending.kind, DecisionKind::Play);
    assert_eq!(pending.player, 0);
}

#[test]
fn illegal_play_is_rejected_and_the_slot_survives() {
    let mut session = new_session(0, &[BotKind::Human, BotKind::Random], 5);
    session.step().expect("step");
    session
        .apply_action(Action::SelectRank { rank: Rank::King })
        .expect("select rank");

    let four = session.state().players[0].hand[..4].to_vec();
    let result = session.apply_action(Action::Play { cards: four });
    assert!(matches!(
        result,
        Err(SessionError::Game(GameError::InvalidPlaySize { count: 4 }))
    ));

    // The rejection leaves the pending slot in place; a legal play goes through.
    assert_eq!(
        session.pending_decision().map(|p| p.kind),
        Some(DecisionKind::Play)
    );
    let one = vec![session.state().players[0].hand[0]];
    session
        .apply_action(Action::Play { cards: one })
        .expect("legal play");
}

#[test]
fn wrong_action_kind_is_rejected() {
    let mut session = new_session(0, &[BotKind::Human, BotKind::Random], 5);
    session.step().expect("step");

    let result = session.apply_action(Action::Challenge { value: true });
    assert!(matches!(
        result,
        Err(SessionError::UnexpectedAction {
            expected: Some(DecisionKind::SelectRank),
            got: DecisionKind::Challenge,
        })
    ));
}

#[test]
fn paused_sessions_refuse_everything() {
    let mut session = new_session(0, &[BotKind::Human, BotKind::Random], 5);
    session.set_paused(true);
    assert!(session.is_paused());
    assert!(session.step().expect("step").is_empty());
    assert!(matches!(
        session.apply_action(Action::SelectRank { rank: Rank::Two }),
        Err(SessionError::GamePaused)
    ));
}

#[test]
fn save_load_reproduces_subsequent_play_exactly() {
    let mut session = new_session(0, &[BotKind::Human, BotKind::Random, BotKind::Random], 123);
    session.step().expect("step");
    advance(&mut session);
    advance(&mut session);

    let save = session.to_save().expect("saves");
    let json = serde_json::to_string(&save).expect("serializes");
    let restored: SessionSave = serde_json::from_str(&json).expect("parses");
    let mut loaded = GameSession::from_save(restored).expect("loads");

    for _ in 0..3 {
        advance(&mut session);
        advance(&mut loaded);
    }

    // Bit-identical futures: states, pending slots, logs and bot generator
    // states all agree after the same decisions.
    let a = serde_json::to_value(session.to_save().expect("saves")).unwrap();
    let b = serde_json::to_value(loaded.to_save().expect("saves")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn unseeded_sessions_record_the_seed_they_drew() {
    let session = GameSession::new(0, vec![BotKind::Human, BotKind::Random], None)
        .expect("valid session");
    let save = session.to_save().expect("saves");
    assert!(save.seed.is_some());
    assert_eq!(save.seed, save.state.rng_seed);
}

#[test]
fn unsupported_save_versions_are_refused() {
    let session = new_session(0, &[BotKind::Human, BotKind::Random], 9);
    let mut save = session.to_save().expect("saves");
    save.version = SAVE_VERSION + 1;
    assert!(matches!(
        GameSession::from_save(save),
        Err(SessionError::UnsupportedSaveVersion(v)) if v == SAVE_VERSION + 1
    ));
}

#[test]
fn seat_configuration_is_validated() {
    assert!(matches!(
        GameSession::new(0, vec![BotKind::Random, BotKind::Random], Some(1)),
        Err(SessionError::InvalidSeats(_))
    ));
    assert!(matches!(
        GameSession::new(2, vec![BotKind::Human, BotKind::Random], Some(1)),
        Err(SessionError::InvalidSeats(_))
    ));
    assert!(matches!(
        GameSession::new(0, vec![BotKind::Human], Some(1)),
        Err(SessionError::InvalidSeats(_))
    ));
    assert!(matches!(
        GameSession::new(0, vec![BotKind::Human, BotKind::Human], Some(1)),
        Err(SessionError::InvalidSeats(_))
    ));
}

#[test]
fn replay_is_not_written_before_the_game_ends() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = new_session(0, &[BotKind::Human, BotKind::Random], 7);
    session.step().expect("step");
    assert_eq!(session.save_replay(dir.path()).expect("no-op"), None);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn finished_sessions_write_their_replay_once() {
    // A hand-built finished save: the whole game already happened.
    let players = vec![
        {
            let mut p = PlayerState::new(Vec::new(), "human");
            p.placement = Some(1);
            p
        },
        {
            let mut p = PlayerState::new(Vec::new(), "random");
            p.placement = Some(2);
            p
        },
    ];
    let mut state = GameState::new(players, Some(3));
    state.placements = vec![0, 1];
    state.current_player = None;

    let initial = ReplayState {
        players: state.projection().players,
        active_rank: None,
        pile: Vec::new(),
        current_player: Some(0),
        placements: Vec::new(),
    };
    let rng_blob = spawn_bots(&[BotKind::Random], Some(3))
        .remove(0)
        .expect("bot")
        .rng_state()
        .expect("state serializes");

    let save = SessionSave {
        version: SAVE_VERSION,
        session_id: "f00f".to_string(),
        seed: Some(3),
        human_index: 0,
        bot_types: vec![BotKind::Human, BotKind::Random],
        state,
        pending_decision: None,
        last_played_cards: Vec::new(),
        last_played_player: None,
        bot_rng_states: vec![None, Some(rng_blob)],
        recorder: RecorderSave {
            metadata: build_metadata(Some(3), 2, vec!["human".into(), "random".into()]),
            initial_state: Some(initial),
            events: vec![
                Event::GameStart,
                Event::Placement { player: 0, place: 1 },
                Event::Placement { player: 1, place: 2 },
                Event::GameEnd {
                    placements: vec![0, 1],
                },
            ],
            snapshot_interval: 10,
        },
        paused: false,
        finished: true,
    };

    let mut session = GameSession::from_save(save).expect("loads");
    assert!(session.is_finished());

    let dir = tempfile::tempdir().expect("tempdir");
    let path = session
        .save_replay(dir.path())
        .expect("writes")
        .expect("path returned");
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("interactive_f00f.json")
    );
    let content = std::fs::read_to_string(&path).expect("readable");
    let replay: Replay = serde_json::from_str(&content).expect("valid replay document");
    assert!(matches!(replay.events.last(), Some(Event::GameEnd { .. })));

    // Write-once: the second call is a no-op.
    assert_eq!(session.save_replay(dir.path()).expect("no-op"), None);
}
