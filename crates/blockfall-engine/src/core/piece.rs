use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::board::{Board, Cell};

/// A falling piece: a shape matrix placed on the board.
///
/// Pieces are immutable values. Movement and rotation return new `Piece`s,
/// which callers check against the [`Board`] before committing.
///
/// # Coordinate System
///
/// - The position is the board coordinate of the matrix's top-left cell
/// - X increases rightward, Y increases downward
/// - Positions may be negative as long as no filled matrix cell leaves the board
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Piece, PieceKind, RotationDirection};
///
/// let board = Board::new(10, 20).unwrap();
/// let piece = Piece::spawn(PieceKind::T, board.width());
/// let moved = piece.right();
/// let rotated = moved
///     .rotated_with_kick(RotationDirection::Clockwise, &board)
///     .unwrap();
/// assert_eq!(rotated.position(), moved.position());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    rotation: PieceRotation,
    matrix: ShapeMatrix,
    position: PiecePosition,
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "kind#rotation@x,y" (e.g., "S#1@4,18")
        let s = format!(
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.0,
            self.position.x,
            self.position.y
        );
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let s = String::deserialize(deserializer)?;

        let (kind_str, rest) = s.split_once('#').ok_or_else(|| {
            D::Error::custom(format!(
                "missing '#' in format 'kind#rotation@x,y', got '{s}'"
            ))
        })?;
        let (rotation_str, position_str) = rest.split_once('@').ok_or_else(|| {
            D::Error::custom(format!(
                "missing '@' in format 'kind#rotation@x,y', got '{s}'"
            ))
        })?;
        let (x_str, y_str) = position_str.split_once(',').ok_or_else(|| {
            D::Error::custom(format!(
                "missing ',' in format 'kind#rotation@x,y', got '{s}'"
            ))
        })?;

        let mut kind_chars = kind_str.chars();
        let kind = match (kind_chars.next(), kind_chars.next()) {
            (Some(c), None) => PieceKind::from_char(c)
                .ok_or_else(|| D::Error::custom(format!("invalid piece kind: {c}")))?,
            _ => {
                return Err(D::Error::custom(format!(
                    "piece kind must be single character, got '{kind_str}'"
                )));
            }
        };

        let rotation_num = rotation_str
            .parse::<u8>()
            .map_err(|e| D::Error::custom(format!("invalid rotation: {rotation_str} ({e})")))?;
        if rotation_num > 3 {
            return Err(D::Error::custom(format!(
                "rotation must be 0-3, got {rotation_num}"
            )));
        }

        let x = x_str
            .parse::<i32>()
            .map_err(|e| D::Error::custom(format!("invalid x position: {x_str} ({e})")))?;
        let y = y_str
            .parse::<i32>()
            .map_err(|e| D::Error::custom(format!("invalid y position: {y_str} ({e})")))?;

        let mut piece = Piece::new(kind, PiecePosition::new(x, y));
        for _ in 0..rotation_num {
            piece = piece.rotated(RotationDirection::Clockwise);
        }
        Ok(piece)
    }
}

impl Piece {
    /// Creates a piece in its spawn orientation at `position`.
    #[must_use]
    pub fn new(kind: PieceKind, position: PiecePosition) -> Self {
        Self {
            kind,
            rotation: PieceRotation::default(),
            matrix: kind.spawn_matrix(),
            position,
        }
    }

    /// Creates a piece at the spawn point of a board `board_width` cells wide.
    ///
    /// The matrix is horizontally centred (rounding left) on the top row.
    #[must_use]
    pub fn spawn(kind: PieceKind, board_width: usize) -> Self {
        let width = i32::try_from(board_width).unwrap_or(i32::MAX);
        let x = (width - matrix_coord(kind.spawn_matrix().size())).div_euclid(2);
        Self::new(kind, PiecePosition::new(x, 0))
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn matrix(&self) -> &ShapeMatrix {
        &self.matrix
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    /// Returns the board coordinates of every filled matrix cell.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.matrix.occupied_cells().map(move |(dx, dy)| {
            (
                self.position.x + matrix_coord(dx),
                self.position.y + matrix_coord(dy),
            )
        })
    }

    #[must_use]
    pub fn moved(&self, dx: i32, dy: i32) -> Self {
        Self {
            position: self.position.shifted(dx, dy),
            ..*self
        }
    }

    #[must_use]
    pub fn left(&self) -> Self {
        self.moved(-1, 0)
    }

    #[must_use]
    pub fn right(&self) -> Self {
        self.moved(1, 0)
    }

    #[must_use]
    pub fn down(&self) -> Self {
        self.moved(0, 1)
    }

    /// Rotates the matrix by 90° in place, keeping the position.
    ///
    /// No collision check is made; see [`Piece::rotated_with_kick`].
    #[must_use]
    pub fn rotated(&self, direction: RotationDirection) -> Self {
        Self {
            rotation: self.rotation.rotated(direction),
            matrix: self.matrix.rotated(direction),
            ..*self
        }
    }

    /// Rotates the piece and resolves collisions with a horizontal wall kick.
    ///
    /// After rotating, the horizontal offsets from [`kick_offsets`] are tried
    /// in order and the first non-colliding placement is returned. Returns
    /// `None` when no offset fits, in which case the rotation is rejected.
    ///
    /// This is a simplified kick: the search only shifts sideways and is
    /// bounded by the matrix width, not by per-rotation kick tables.
    #[must_use]
    pub fn rotated_with_kick(&self, direction: RotationDirection, board: &Board) -> Option<Self> {
        let rotated = self.rotated(direction);
        kick_offsets(rotated.matrix.size())
            .into_iter()
            .map(|dx| rotated.moved(dx, 0))
            .find(|piece| !board.collides(piece))
    }

    /// Returns where the piece would come to rest if hard-dropped.
    ///
    /// The piece keeps moving down while the board reports no collision.
    #[must_use]
    pub fn ghost_position(&self, board: &Board) -> Self {
        let mut dropped = *self;
        loop {
            let next = dropped.down();
            if board.collides(&next) {
                return dropped;
            }
            dropped = next;
        }
    }
}

/// Horizontal offsets tried by the wall kick for a matrix `width` cells wide.
///
/// The sequence alternates sign with growing magnitude:
/// `0, +1, -1, +2, -2, ..., +width, -width`.
///
/// ```
/// use blockfall_engine::kick_offsets;
///
/// assert_eq!(kick_offsets(2).as_slice(), &[0, 1, -1, 2, -2]);
/// ```
#[must_use]
pub fn kick_offsets(width: usize) -> ArrayVec<i32, { 2 * ShapeMatrix::MAX_SIZE + 1 }> {
    let mut offsets = ArrayVec::new();
    offsets.push(0);
    for magnitude in 1..=matrix_coord(width.min(ShapeMatrix::MAX_SIZE)) {
        offsets.push(magnitude);
        offsets.push(-magnitude);
    }
    offsets
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn matrix_coord(n: usize) -> i32 {
    debug_assert!(n <= ShapeMatrix::MAX_SIZE);
    n as i32
}

/// Board coordinate of a piece matrix's top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PiecePosition {
    x: i32,
    y: i32,
}

impl PiecePosition {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn shifted(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Direction of a quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    /// Maps a signed direction (`+1` clockwise, `-1` counter-clockwise) to a
    /// rotation direction. Zero counts as clockwise.
    #[must_use]
    pub const fn from_sign(sign: i32) -> Self {
        if sign < 0 {
            Self::CounterClockwise
        } else {
            Self::Clockwise
        }
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }
}

/// Rotation state of a piece.
///
/// Counts clockwise quarter turns from the spawn orientation:
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° counter-clockwise)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    pub const fn rotated(self, direction: RotationDirection) -> Self {
        match direction {
            RotationDirection::Clockwise => Self((self.0 + 1) % 4),
            RotationDirection::CounterClockwise => Self((self.0 + 3) % 4),
        }
    }

    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        self.0
    }
}

/// The seven piece shapes.
///
/// The discriminant is the shape id written into the board when the piece locks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::Display,
)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 1,
    /// J-piece.
    J = 2,
    /// L-piece.
    L = 3,
    /// O-piece.
    O = 4,
    /// S-piece.
    S = 5,
    /// T-piece.
    T = 6,
    /// Z-piece.
    Z = 7,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// Every piece kind, in shape id order.
    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Returns the shape id (`1..=7`).
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(PieceKind::I),
            2 => Some(PieceKind::J),
            3 => Some(PieceKind::L),
            4 => Some(PieceKind::O),
            5 => Some(PieceKind::S),
            6 => Some(PieceKind::T),
            7 => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Returns the shape matrix in spawn orientation.
    #[must_use]
    pub const fn spawn_matrix(self) -> ShapeMatrix {
        SPAWN_SHAPES[self as usize - 1]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'T' => Some(PieceKind::T),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }
}

/// Square grid of cells describing a piece shape in one orientation.
///
/// Only the top-left `size x size` cells are meaningful. Rotation permutes
/// the cells; the shape id stored in filled cells never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeMatrix {
    size: usize,
    cells: [[Cell; Self::MAX_SIZE]; Self::MAX_SIZE],
}

impl ShapeMatrix {
    /// Largest matrix side length (the I-piece).
    pub const MAX_SIZE: usize = 4;

    const fn from_mask(kind: PieceKind, size: usize, mask: [[bool; 4]; 4]) -> Self {
        let mut cells = [[Cell::Empty; Self::MAX_SIZE]; Self::MAX_SIZE];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                if mask[y][x] {
                    cells[y][x] = Cell::Filled(kind);
                }
                x += 1;
            }
            y += 1;
        }
        Self { size, cells }
    }

    /// Side length of the matrix.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the cell at `(x, y)`, or `None` outside the matrix.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.size && y < self.size).then(|| self.cells[y][x])
    }

    /// Iterates over the matrix rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells[..self.size].iter().map(|row| &row[..self.size])
    }

    /// Returns matrix-local coordinates of every filled cell.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| !cell.is_empty())
                .map(move |(x, _)| (x, y))
        })
    }

    /// Swaps the matrix across its main diagonal.
    #[must_use]
    pub fn transposed(&self) -> Self {
        let mut out = *self;
        for y in 0..self.size {
            for x in 0..self.size {
                out.cells[y][x] = self.cells[x][y];
            }
        }
        out
    }

    /// Rotates the matrix by 90°.
    ///
    /// The matrix is transposed, then each row is reversed (clockwise) or the
    /// row order is reversed (counter-clockwise).
    #[must_use]
    pub fn rotated(&self, direction: RotationDirection) -> Self {
        let mut out = self.transposed();
        let rows = &mut out.cells[..self.size];
        match direction {
            RotationDirection::Clockwise => {
                for row in rows {
                    row[..self.size].reverse();
                }
            }
            RotationDirection::CounterClockwise => rows.reverse(),
        }
        out
    }
}

impl fmt::Display for ShapeMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                f.write_str("\n")?;
            }
            for cell in row {
                match cell {
                    Cell::Empty => f.write_str(".")?,
                    Cell::Filled(kind) => write!(f, "{kind}")?,
                }
            }
        }
        Ok(())
    }
}

const SPAWN_SHAPES: [ShapeMatrix; PieceKind::LEN] = {
    use ShapeMatrix as M;
    const C: bool = true;
    const E: bool = false;
    const EEEE: [bool; 4] = [E; 4];
    [
        // I-piece
        M::from_mask(PieceKind::I, 4, [EEEE, [C, C, C, C], EEEE, EEEE]),
        // J-piece
        M::from_mask(PieceKind::J, 3, [[C, E, E, E], [C, C, C, E], EEEE, EEEE]),
        // L-piece
        M::from_mask(PieceKind::L, 3, [[E, E, C, E], [C, C, C, E], EEEE, EEEE]),
        // O-piece
        M::from_mask(PieceKind::O, 2, [[C, C, E, E], [C, C, E, E], EEEE, EEEE]),
        // S-piece
        M::from_mask(PieceKind::S, 3, [[E, C, C, E], [C, C, E, E], EEEE, EEEE]),
        // T-piece
        M::from_mask(PieceKind::T, 3, [[E, C, E, E], [C, C, C, E], EEEE, EEEE]),
        // Z-piece
        M::from_mask(PieceKind::Z, 3, [[C, C, E, E], [E, C, C, E], EEEE, EEEE]),
    ]
};
