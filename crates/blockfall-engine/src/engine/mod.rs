//! Game rules and session management.
//!
//! This module builds gameplay on top of the [`core`](crate::core) data structures:
//!
//! - [`GameSession`] - the state machine (spawn, move, rotate, drop, lock, sweep)
//! - [`GameStats`] - score, level, lines and drop interval of a session
//! - [`ScoringPolicy`] - pure mapping from line clears to score/level deltas
//! - [`PieceBag`] - 7-bag piece generation
//! - [`PieceSeed`] - seed for deterministic piece generation
//! - [`GameConfig`] - board size and scoring settings
//! - [`SessionSnapshot`] / [`SessionEvent`] - what hosts read back
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`] from a [`GameConfig`] and call [`GameSession::start`]
//! 2. Feed elapsed time with [`GameSession::tick`] and player intents
//!    (move, rotate, soft/hard drop)
//! 3. A piece that cannot move down locks, full rows are swept and scored,
//!    and the next piece spawns
//! 4. The game ends when a new piece collides at spawn
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{GameConfig, GameSession, PieceSeed, RotationDirection};
//!
//! let seed = PieceSeed::from_bytes([7; 16]);
//! let mut session = GameSession::with_seed(GameConfig::default(), seed).unwrap();
//! session.start().unwrap();
//!
//! session.try_move(-1).ok();
//! session.try_rotate(RotationDirection::Clockwise).ok();
//! let outcome = session.hard_drop().unwrap();
//! assert_eq!(outcome.cleared_lines, 0);
//! assert_eq!(session.board().occupied_count(), 4);
//! ```

pub use self::{
    config::*, event::*, game_session::*, game_stats::*, piece_bag::*, scoring::*, snapshot::*,
};

mod config;
mod event;
mod game_session;
mod game_stats;
mod piece_bag;
mod scoring;
mod snapshot;
