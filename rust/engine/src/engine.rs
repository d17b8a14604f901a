//! The turn state machine. Owns the canonical [`GameState`] and advances it
//! one decision at a time, mirroring every accepted mutation into the replay
//! recorder. Seat-turn phases: rank selection (only when the active rank is
//! unset), play, challenge decision by the next active seat, then either
//! challenge resolution or plain advance; a win/quad fixpoint runs after any
//! hand-changing step.

use crate::bot::{BotPolicy, PublicView};
use crate::cards::{all_ranks, Card, Rank};
use crate::deck::Deck;
use crate::errors::GameError;
use crate::game::{GameState, PlayerState};
use crate::replay::{build_metadata, Event, ReplayRecorder};

/// Core engine for one game of Cheat.
///
/// All rule checks live here: drivers (the batch runner and the interactive
/// session) only ever mutate the game through
/// [`Engine::select_active_rank`], [`Engine::play`] and
/// [`Engine::decide_challenge`]. A rejected operation leaves the state
/// untouched.
#[derive(Debug)]
pub struct Engine {
    state: GameState,
    recorder: ReplayRecorder,
    last_played_cards: Vec<Card>,
    last_played_player: Option<usize>,
    pending_challenger: Option<usize>,
    game_over: bool,
}

impl Engine {
    /// Deal a fresh game: seeded shuffle, round-robin deal, initial replay
    /// snapshot, `GAME_START`, and the opening win/quad fixpoint (a dealt
    /// hand may already contain quads). An omitted seed is drawn from
    /// entropy and recorded in the state and replay metadata, so even an
    /// unseeded game stays reproducible from its replay.
    pub fn new(
        seed: Option<u64>,
        bot_names: &[String],
        snapshot_interval: usize,
    ) -> Result<Self, GameError> {
        let seed = seed.unwrap_or_else(rand::random);
        let mut deck = Deck::new_with_seed(seed);
        deck.shuffle();
        let hands = deck.deal(bot_names.len())?;
        let players: Vec<PlayerState> = hands
            .into_iter()
            .zip(bot_names)
            .map(|(hand, name)| PlayerState::new(hand, name.clone()))
            .collect();
        let state = GameState::new(players, Some(seed));

        let metadata = build_metadata(Some(seed), bot_names.len(), bot_names.to_vec());
        let mut recorder = ReplayRecorder::new(metadata, snapshot_interval);
        recorder.set_initial_state(state.projection());
        recorder.record(Event::GameStart);

        let mut engine = Self {
            state,
            recorder,
            last_played_cards: Vec::new(),
            last_played_player: None,
            pending_challenger: None,
            game_over: false,
        };
        engine.check_wins();
        engine.resolve_discard_quads();
        engine.finalize_if_needed();
        Ok(engine)
    }

    /// Reassemble an engine from persisted session parts. No events are
    /// recorded; the recorder arrives with its history intact.
    pub fn from_parts(
        state: GameState,
        recorder: ReplayRecorder,
        last_played_cards: Vec<Card>,
        last_played_player: Option<usize>,
        pending_challenger: Option<usize>,
        finished: bool,
    ) -> Self {
        Self {
            state,
            recorder,
            last_played_cards,
            last_played_player,
            pending_challenger,
            game_over: finished,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn recorder(&self) -> &ReplayRecorder {
        &self.recorder
    }

    pub fn events(&self) -> &[Event] {
        self.recorder.events()
    }

    pub fn current_player(&self) -> Option<usize> {
        self.state.current_player
    }

    pub fn active_rank(&self) -> Option<Rank> {
        self.state.active_rank
    }

    /// The seat that must decide the open challenge window, if any.
    pub fn challenge_seat(&self) -> Option<usize> {
        self.pending_challenger
    }

    pub fn last_played_cards(&self) -> &[Card] {
        &self.last_played_cards
    }

    pub fn last_played_player(&self) -> Option<usize> {
        self.last_played_player
    }

    pub fn is_finished(&self) -> bool {
        self.game_over
    }

    /// Public view for a rank-selection or play decision.
    pub fn public_view(&self) -> PublicView {
        self.view(0, None)
    }

    /// Public view for a challenge decision: includes the size and seat of
    /// the play under challenge.
    pub fn challenge_view(&self) -> PublicView {
        self.view(self.last_played_cards.len(), self.last_played_player)
    }

    fn view(&self, last_play_count: usize, last_player: Option<usize>) -> PublicView {
        PublicView {
            active_rank: self.state.active_rank,
            pile_size: self.state.pile.len(),
            hand_sizes: self.state.hand_sizes(),
            known_discarded: self.state.known_discarded.clone(),
            known_revealed: self.state.known_revealed.clone(),
            last_play_count,
            last_player,
        }
    }

    /// Set the rank to be claimed for a fresh round.
    pub fn select_active_rank(&mut self, seat: usize, rank: Rank) -> Result<(), GameError> {
        self.ensure_seat(seat)?;
        self.ensure_no_pending_challenge()?;
        self.ensure_current(seat)?;
        if self.state.active_rank.is_some() {
            return Err(GameError::RankAlreadySet);
        }
        self.state.active_rank = Some(rank);
        self.recorder.record(Event::SelectRank { player: seat, rank });
        self.state.add_log(format!("P{seat} selects active rank {rank}."));
        Ok(())
    }

    /// Play 1-3 cards face-down under the active rank's claim. On success the
    /// cards move to the pile, the turn counter bumps, the win/quad fixpoint
    /// runs, and a challenge window opens for the next active seat.
    pub fn play(&mut self, seat: usize, cards: &[Card], claim: Rank) -> Result<(), GameError> {
        self.ensure_seat(seat)?;
        self.ensure_no_pending_challenge()?;
        self.ensure_current(seat)?;
        let active = self.state.active_rank.ok_or(GameError::RankNotSelected)?;
        if claim != active {
            return Err(GameError::ClaimMismatch {
                claimed: claim,
                active,
            });
        }
        if cards.is_empty() || cards.len() > 3 {
            return Err(GameError::InvalidPlaySize { count: cards.len() });
        }
        // Validate against a scratch copy so a bad request (including the
        // same card twice) leaves the hand untouched.
        let mut scratch = self.state.players[seat].hand.clone();
        for card in cards {
            let pos = scratch
                .iter()
                .position(|c| c == card)
                .ok_or(GameError::CardNotInHand { seat, card: *card })?;
            scratch.remove(pos);
        }
        self.state.players[seat].hand = scratch;
        self.state.pile.extend(cards.iter().copied());
        self.state.turn_count += 1;
        self.last_played_cards = cards.to_vec();
        self.last_played_player = Some(seat);
        self.recorder.record(Event::Play {
            player: seat,
            claim_rank: claim,
            cards: cards.to_vec(),
        });
        self.state.add_log(format!(
            "P{seat} plays {} claiming {claim} (pile={})",
            cards.len(),
            self.state.pile.len()
        ));
        self.log_hand_sizes();
        self.check_wins();
        self.resolve_discard_quads();

        if let Some(challenger) = self.state.next_active_after(seat) {
            self.pending_challenger = Some(challenger);
            let name = self.state.players[challenger].bot.clone();
            self.state
                .challenge_stats
                .entry(name)
                .or_default()
                .opportunities += 1;
        }
        self.finalize_if_needed();
        Ok(())
    }

    /// Record a CHALLENGE_EVAL diagnostic for the pending challenger.
    pub fn record_challenge_eval(&mut self, challenger: usize, message: String) {
        self.recorder.record(Event::ChallengeEval {
            challenger,
            message,
        });
    }

    /// Decide the open challenge window. A `true` decision reveals the
    /// played cards, resolves truthfulness against the active rank, and
    /// awards the whole pile to whoever was wrong about it; a `false`
    /// decision simply hands the turn to the challenger.
    pub fn decide_challenge(&mut self, seat: usize, challenge: bool) -> Result<(), GameError> {
        self.ensure_seat(seat)?;
        let challenger = self
            .pending_challenger
            .ok_or(GameError::NoChallengePending)?;
        if seat != challenger {
            return Err(GameError::NotPlayersTurn {
                expected: challenger,
                actual: seat,
            });
        }
        let active = self.state.active_rank.ok_or(GameError::RankNotSelected)?;
        let player = self
            .last_played_player
            .ok_or(GameError::NoChallengePending)?;

        self.recorder.record(Event::ChallengeDecision {
            challenger: seat,
            challenge,
        });
        if challenge {
            let truthful = self.last_played_cards.iter().all(|c| c.rank == active);
            let name = self.state.players[seat].bot.clone();
            let stats = self.state.challenge_stats.entry(name).or_default();
            stats.attempts += 1;
            if !truthful {
                stats.success += 1;
            }
            self.recorder.record(Event::ChallengeResolution {
                challenger: seat,
                truthful,
                revealed: self.last_played_cards.clone(),
            });
            self.state.add_log(format!(
                "P{seat} challenges -> {}",
                if truthful { "TRUTH" } else { "LIE" }
            ));
            let revealed: Vec<String> =
                self.last_played_cards.iter().map(Card::to_string).collect();
            self.state.add_log(format!("Revealed: {}", revealed.join(", ")));
            for card in &self.last_played_cards {
                *self.state.known_revealed.entry(card.rank).or_insert(0) += 1;
            }
            let picker = if truthful { seat } else { player };
            let pickup = std::mem::take(&mut self.state.pile);
            self.state.pile_pickups.push(pickup.len());
            self.recorder.record(Event::PickupPile {
                player: picker,
                cards: pickup.clone(),
            });
            self.state.add_log(format!(
                "P{picker} picks up {} cards. Pile cleared.",
                pickup.len()
            ));
            self.state.players[picker].hand.extend(pickup);
            self.state.active_rank = None;
            // Turn passes to the seat after the pile recipient, exactly as
            // the reducer recomputes it at PICKUP_PILE; any placements from
            // the fixpoint below advance it further.
            self.state.current_player = self.state.next_active_after(picker);
            self.log_hand_sizes();
            self.check_wins();
            self.resolve_discard_quads();
        } else {
            self.state.add_log(format!("P{seat} does not challenge."));
            self.state.current_player = Some(seat);
        }
        self.pending_challenger = None;
        self.last_played_cards.clear();
        self.last_played_player = None;
        self.finalize_if_needed();
        Ok(())
    }

    /// Drive bot policies to game end. Used by the batch driver; the
    /// interactive session runs its own loop so it can suspend on the human
    /// seat.
    pub fn run<P: BotPolicy>(&mut self, bots: &mut [P]) -> Result<(), GameError> {
        if bots.len() != self.state.players.len() {
            return Err(GameError::BotCountMismatch {
                seats: self.state.players.len(),
                bots: bots.len(),
            });
        }
        while !self.game_over {
            let Some(current) = self.state.current_player else {
                break;
            };
            if self.state.players[current].placement.is_some() {
                // Should not happen; skip the finished seat defensively.
                self.state.current_player = self.state.next_active_after(current);
                self.finalize_if_needed();
                continue;
            }
            if self.state.active_rank.is_none() {
                let view = self.public_view();
                let rank = bots[current].choose_active_rank(&self.state.players[current].hand, &view);
                self.select_active_rank(current, rank)?;
            }
            let view = self.public_view();
            let (cards, claim) = bots[current].choose_play(&self.state.players[current].hand, &view);
            self.play(current, &cards, claim)?;
            if let Some(challenger) = self.pending_challenger {
                let view = self.challenge_view();
                let decision =
                    bots[challenger].should_challenge(&self.state.players[challenger].hand, &view);
                if let Some(message) = bots[challenger].last_challenge_eval() {
                    self.record_challenge_eval(challenger, message);
                }
                self.decide_challenge(challenger, decision)?;
            }
        }
        self.finalize_if_needed();
        Ok(())
    }

    /// Assign the next placement to every seat whose hand has emptied, in
    /// player-index order. Advances the turn past a finished current seat,
    /// matching the reducer's PLACEMENT handling.
    pub fn check_wins(&mut self) {
        for idx in 0..self.state.players.len() {
            if self.state.players[idx].placement.is_none() && self.state.players[idx].hand.is_empty()
            {
                self.state.placements.push(idx);
                let place = self.state.placements.len() as u32;
                self.state.players[idx].placement = Some(place);
                self.recorder.record(Event::Placement { player: idx, place });
                self.state.add_log(format!("P{idx} finishes in place {place}."));
                if self.state.current_player == Some(idx) {
                    self.state.current_player = self.state.next_active_after(idx);
                }
            }
        }
    }

    /// Remove complete non-Ace quads from non-finished hands, re-scanning to
    /// fixpoint. One quad per pass; ties break by player index ascending,
    /// then rank ascending. A win check runs after every removal since a
    /// quad discard can empty a hand.
    pub fn resolve_discard_quads(&mut self) {
        loop {
            let Some((seat, rank)) = self.find_quad() else {
                break;
            };
            let quad: Vec<Card> = self.state.players[seat]
                .hand
                .iter()
                .filter(|c| c.rank == rank)
                .copied()
                .collect();
            self.state.players[seat].hand.retain(|c| c.rank != rank);
            self.state.players[seat].discarded.extend(quad.iter().copied());
            *self.state.known_discarded.entry(rank).or_insert(0) += 4;
            self.recorder.record(Event::DiscardQuad {
                player: seat,
                rank,
                cards: quad,
            });
            self.state.add_log(format!("P{seat} discards four {rank}s."));
            self.log_hand_sizes();
            self.check_wins();
        }
    }

    fn find_quad(&self) -> Option<(usize, Rank)> {
        for (idx, player) in self.state.players.iter().enumerate() {
            if player.placement.is_some() {
                continue;
            }
            for rank in all_ranks() {
                if rank == Rank::Ace {
                    continue;
                }
                if player.hand.iter().filter(|c| c.rank == rank).count() == 4 {
                    return Some((idx, rank));
                }
            }
        }
        None
    }

    /// Close out the game once every seat has a placement, or force-place
    /// the stragglers if rotation somehow ran out of active seats.
    fn finalize_if_needed(&mut self) {
        if self.game_over {
            return;
        }
        let total = self.state.players.len();
        if self.state.placements.len() >= total {
            self.record_game_end();
            return;
        }
        if self.state.active_players().is_empty() || self.state.current_player.is_none() {
            // Defensive: should not occur under correct rules.
            for idx in 0..total {
                if self.state.players[idx].placement.is_none() {
                    self.state.placements.push(idx);
                    let place = self.state.placements.len() as u32;
                    self.state.players[idx].placement = Some(place);
                    self.recorder.record(Event::Placement { player: idx, place });
                }
            }
            self.record_game_end();
        }
    }

    fn record_game_end(&mut self) {
        self.recorder.record(Event::GameEnd {
            placements: self.state.placements.clone(),
        });
        self.state.current_player = None;
        self.game_over = true;
    }

    fn ensure_seat(&self, seat: usize) -> Result<(), GameError> {
        if seat >= self.state.players.len() {
            return Err(GameError::SeatOutOfRange(seat));
        }
        Ok(())
    }

    fn ensure_current(&self, seat: usize) -> Result<(), GameError> {
        match self.state.current_player {
            Some(current) if current == seat => Ok(()),
            Some(current) => Err(GameError::NotPlayersTurn {
                expected: current,
                actual: seat,
            }),
            None => Err(GameError::GameOver),
        }
    }

    fn ensure_no_pending_challenge(&self) -> Result<(), GameError> {
        if self.pending_challenger.is_some() {
            return Err(GameError::ChallengePending);
        }
        Ok(())
    }

    fn log_hand_sizes(&mut self) {
        let sizes: Vec<String> = self
            .state
            .players
            .iter()
            .enumerate()
            .map(|(idx, p)| format!("P{idx}:{}", p.hand.len()))
            .collect();
        self.state.add_log(format!("Hand sizes -> {}", sizes.join(" ")));
    }
}
