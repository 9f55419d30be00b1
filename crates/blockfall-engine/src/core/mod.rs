//! Core data structures: the locked-cell grid and the falling piece.

pub use self::{board::*, piece::*};

pub(crate) mod board;
pub(crate) mod piece;
