//! # cheat-session: interactive game sessions
//!
//! Wraps one [`Engine`](cheat_engine::engine::Engine) so that exactly one
//! seat is driven by an external actor. The turn loop runs bots
//! synchronously and suspends (by returning, not blocking) whenever the
//! human seat must decide; [`GameSession::apply_action`] injects that
//! decision and [`GameSession::step`] resumes the bots.
//!
//! Sessions serialize completely, including the exact internal state of
//! every bot generator, so a restored session behaves bit-for-bit like one
//! that was never saved.

mod errors;
mod save;
mod session;

pub use errors::SessionError;
pub use save::{RecorderSave, SessionSave, SAVE_VERSION};
pub use session::{Action, DecisionKind, GameSession, PendingDecision};
