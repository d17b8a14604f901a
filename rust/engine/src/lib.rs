//! # cheat-engine: Cheat (bluffing card game) core
//!
//! A deterministic engine for the shedding/bluffing card game "Cheat":
//! players discard cards face-down under a claimed rank, the next seat may
//! challenge, and the pile goes to whoever was wrong. Every accepted
//! mutation is mirrored into an event-sourced replay log that can rebuild
//! and verify the exact run, and all randomness flows from seeded ChaCha20
//! generators for reproducible games.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card, rank and suit representation and the 52-card deck
//! - [`deck`] - Deterministic shuffling and round-robin dealing
//! - [`bot`] - The bot-policy capability trait and restricted public view
//! - [`game`] - The canonical game-state aggregate
//! - [`engine`] - The turn state machine
//! - [`replay`] - Event recorder, reducer, snapshots and log validator
//! - [`errors`] - Rule-violation and replay decode errors
//!
//! ## Deterministic gameplay
//!
//! ```rust
//! use cheat_engine::engine::Engine;
//!
//! let names = vec!["random".to_string(); 4];
//! let a = Engine::new(Some(42), &names, 10).unwrap();
//! let b = Engine::new(Some(42), &names, 10).unwrap();
//! // Same seed, same deal.
//! assert_eq!(a.state().projection(), b.state().projection());
//! ```

pub mod bot;
pub mod cards;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod game;
pub mod replay;
