use serde::Serialize;

use crate::PieceKind;

/// Notable transitions, queued by the session for hosts to drain with
/// [`GameSession::take_events`](super::GameSession::take_events).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The active piece was committed to the board.
    PieceLocked {
        kind: PieceKind,
        cleared_lines: usize,
    },
    /// The level went up.
    LevelUp { level: u64 },
    /// A freshly spawned piece collided; the session is over.
    GameOver { score: u64 },
    /// Final score to hand to score persistence.
    ///
    /// Only emitted right after [`SessionEvent::GameOver`] when the score is positive.
    ScoreFinalized { score: u64 },
}
