use std::time::Duration;

use serde::Serialize;

use crate::{Board, Piece, PieceKind};

use super::game_session::SessionState;

/// Read-only copy of everything a renderer needs for one frame.
///
/// Snapshots are detached from the session, so they can be handed to other
/// readers without borrowing the live game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub board: Board,
    pub active_piece: Option<Piece>,
    pub ghost_piece: Option<Piece>,
    pub next_piece: Option<PieceKind>,
    pub score: u64,
    pub level: u64,
    pub total_cleared_lines: u64,
    /// Auto-drop period at the current level.
    pub drop_interval: Duration,
    /// Locks per number of rows cleared, as in
    /// [`GameStats::line_cleared_counter`](super::GameStats::line_cleared_counter).
    pub line_clears: [u64; 5],
    pub state: SessionState,
    pub is_over: bool,
}
