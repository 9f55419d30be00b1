//! Falling-block puzzle engine.
//!
//! The crate is split in two layers:
//!
//! - [`core`] - plain data structures: the [`Board`] grid and the falling [`Piece`]
//! - [`engine`] - game rules built on top: the 7-bag [`PieceBag`], the
//!   [`ScoringPolicy`], and the [`GameSession`] state machine
//!
//! Hosts (renderers, input dispatchers, score persistence) drive a
//! [`GameSession`] through its lifecycle and intent methods and read
//! [`SessionSnapshot`]s back.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A piece placement overlaps locked cells or leaves the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece colliding with the board")]
pub struct PieceCollisionError;

/// Reason an input intent (move, rotate, drop) was rejected.
///
/// A rejected intent never changes the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum IntentError {
    #[display("session is not running")]
    NotRunning,
    #[display("intent rejected: {_0}")]
    Collision(PieceCollisionError),
}

impl From<PieceCollisionError> for IntentError {
    fn from(err: PieceCollisionError) -> Self {
        Self::Collision(err)
    }
}

/// A lifecycle operation was requested from a state that does not allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("cannot {action} a session that is {state}")]
pub struct LifecycleError {
    pub action: &'static str,
    pub state: SessionState,
}

/// Invalid [`GameConfig`] values, detected before a session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board must be at least {min}x{min}, got {width}x{height}")]
    BoardTooSmall {
        width: usize,
        height: usize,
        min: usize,
    },
    #[display("board must be at most {max}x{max}, got {width}x{height}")]
    BoardTooLarge {
        width: usize,
        height: usize,
        max: usize,
    },
    #[display("lines per level must be positive")]
    ZeroLinesPerLevel,
    #[display("minimum drop interval must be positive")]
    ZeroMinDropInterval,
    #[display("initial drop interval {initial_ms}ms is below the minimum {min_ms}ms")]
    InitialBelowMinDropInterval { initial_ms: u64, min_ms: u64 },
}

/// Failure to parse the text form of a [`Board`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardParseError {
    #[display("board text has no rows")]
    Empty,
    #[display("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("invalid cell {ch:?} at row {row}, column {column}")]
    InvalidCell { ch: char, row: usize, column: usize },
    #[display("invalid board size: {_0}")]
    Size(ConfigError),
}
