use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{BoardParseError, ConfigError};

use super::piece::{Piece, PieceKind, ShapeMatrix};

/// A single cell of the board grid.
///
/// The numeric id of a cell is `0` when empty and the shape id (`1..=7`) of
/// the piece that was locked there otherwise. The id only selects a colour;
/// gameplay treats every filled cell the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// No locked block.
    #[default]
    Empty,
    /// Block locked by a piece of the given kind.
    Filled(PieceKind),
}

impl Cell {
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Returns the numeric cell value (`0` for empty, shape id otherwise).
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Filled(kind) => kind.id(),
        }
    }

    /// Builds a cell from its numeric value.
    ///
    /// ```
    /// use blockfall_engine::{Cell, PieceKind};
    ///
    /// assert_eq!(Cell::from_id(0), Some(Cell::Empty));
    /// assert_eq!(Cell::from_id(6), Some(Cell::Filled(PieceKind::T)));
    /// assert_eq!(Cell::from_id(8), None);
    /// ```
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        if id == 0 {
            return Some(Cell::Empty);
        }
        match PieceKind::from_id(id) {
            Some(kind) => Some(Cell::Filled(kind)),
            None => None,
        }
    }

    const fn as_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Filled(kind) => kind.as_char(),
        }
    }

    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '.' => Some(Cell::Empty),
            '0'..='9' => ch
                .to_digit(10)
                .and_then(|d| u8::try_from(d).ok())
                .and_then(Cell::from_id),
            _ => PieceKind::from_char(ch).map(Cell::Filled),
        }
    }
}

/// Fixed-size grid of locked cells.
///
/// Row `0` is the top of the board and `x` grows to the right. The dimensions
/// are chosen at construction and never change afterwards; every mutation
/// (locking, sweeping) keeps the grid rectangular.
///
/// The board is the single authority on whether a piece placement is legal,
/// see [`Board::collides`].
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Piece, PieceKind};
///
/// let mut board = Board::new(10, 20).unwrap();
/// let piece = Piece::spawn(PieceKind::O, board.width());
/// assert!(!board.collides(&piece));
///
/// board.lock(&piece);
/// assert_eq!(board.occupied_count(), 4);
/// assert!(board.collides(&piece));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Smallest allowed width and height; every shape matrix fits inside.
    pub const MIN_SIZE: usize = ShapeMatrix::MAX_SIZE;

    /// Largest allowed width and height.
    ///
    /// Keeps every cell coordinate well inside `i32`, which piece positions use.
    pub const MAX_SIZE: usize = 1024;

    /// Checks that `width` x `height` is an allowed board size.
    pub fn check_size(width: usize, height: usize) -> Result<(), ConfigError> {
        if width < Self::MIN_SIZE || height < Self::MIN_SIZE {
            return Err(ConfigError::BoardTooSmall {
                width,
                height,
                min: Self::MIN_SIZE,
            });
        }
        if width > Self::MAX_SIZE || height > Self::MAX_SIZE {
            return Err(ConfigError::BoardTooLarge {
                width,
                height,
                max: Self::MAX_SIZE,
            });
        }
        Ok(())
    }

    /// Creates an empty board.
    ///
    /// Fails unless both dimensions are within
    /// [`Board::MIN_SIZE`]..=[`Board::MAX_SIZE`].
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        Self::check_size(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(y * self.width + x)
    }

    /// Returns the cell at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Returns a mutable reference to the cell at `(x, y)`, or `None` outside the grid.
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Iterates over rows from top to bottom.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[Cell]> + '_ {
        self.cells.chunks_exact(self.width)
    }

    fn row(&self, y: usize) -> &[Cell] {
        &self.cells[y * self.width..][..self.width]
    }

    /// Returns `true` when row `y` exists and contains no empty cell.
    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        y < self.height && self.row(y).iter().all(|cell| !cell.is_empty())
    }

    /// Counts the non-empty cells on the board.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /// Empties every cell, keeping the dimensions.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    /// Checks whether `piece` overlaps a locked cell or leaves the grid.
    ///
    /// Every non-empty matrix cell must map inside `[0, width) x [0, height)`
    /// onto an empty board cell; anything else is a collision.
    #[must_use]
    pub fn collides(&self, piece: &Piece) -> bool {
        piece
            .occupied_positions()
            .any(|(x, y)| self.get(x, y).is_none_or(|cell| !cell.is_empty()))
    }

    /// Copies the piece's cells into the board at its current position.
    ///
    /// The placement must have been checked with [`Board::collides`]; cells
    /// that fall outside the grid are dropped.
    pub fn lock(&mut self, piece: &Piece) {
        debug_assert!(!self.collides(piece), "locking a colliding piece");
        let cell = Cell::Filled(piece.kind());
        for (x, y) in piece.occupied_positions() {
            if let Some(target) = self.get_mut(x, y) {
                *target = cell;
            }
        }
    }

    /// Removes every full row and returns how many were removed.
    ///
    /// Rows are scanned bottom to top. Remaining rows keep their relative
    /// order and slide down; the vacated rows at the top are emptied.
    pub fn sweep_full_rows(&mut self) -> usize {
        let width = self.width;
        let mut count = 0;
        for y in (0..self.height).rev() {
            if self.is_row_full(y) {
                count += 1;
                continue;
            }
            if count > 0 {
                let src = y * width;
                self.cells.copy_within(src..src + width, src + count * width);
            }
        }
        self.cells[..count * width].fill(Cell::Empty);
        count
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                f.write_str("\n")?;
            }
            for cell in row {
                write!(f, "{}", cell.as_char())?;
            }
        }
        Ok(())
    }
}

/// Parses the text form: one line per row, `.` or `0` for empty cells and a
/// shape id digit or piece letter for locked cells.
///
/// Leading and trailing whitespace on each line is ignored.
impl FromStr for Board {
    type Err = BoardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        Self::from_rows(&lines)
    }
}

impl Board {
    fn from_rows<S>(rows: &[S]) -> Result<Self, BoardParseError>
    where
        S: AsRef<str>,
    {
        let first = rows.first().ok_or(BoardParseError::Empty)?;
        let width = first.as_ref().chars().count();
        let mut board = Board::new(width, rows.len()).map_err(BoardParseError::Size)?;
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(BoardParseError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let cell = Cell::from_char(ch).ok_or(BoardParseError::InvalidCell {
                    ch,
                    row: y,
                    column: x,
                })?;
                board.cells[y * width + x] = cell;
            }
        }
        Ok(board)
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Format: ["..........", "...TTT....", ...]
        serializer.collect_seq(
            self.rows()
                .map(|row| row.iter().map(|cell| cell.as_char()).collect::<String>()),
        )
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        Board::from_rows(&rows).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::{PiecePosition, RotationDirection};

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_rejects_small_boards() {
        assert!(Board::new(10, 20).is_ok());
        assert!(Board::new(4, 4).is_ok());
        assert_eq!(
            Board::new(0, 20),
            Err(ConfigError::BoardTooSmall {
                width: 0,
                height: 20,
                min: 4
            })
        );
        assert!(Board::new(10, 3).is_err());
    }

    #[test]
    fn test_new_rejects_huge_boards() {
        assert!(Board::new(Board::MAX_SIZE, 4).is_ok());
        assert_eq!(
            Board::new(Board::MAX_SIZE + 1, 20),
            Err(ConfigError::BoardTooLarge {
                width: Board::MAX_SIZE + 1,
                height: 20,
                max: Board::MAX_SIZE
            })
        );
        // Would overflow `width * height` without the bound.
        assert!(matches!(
            Board::new(usize::MAX / 2 + 1, 4),
            Err(ConfigError::BoardTooLarge { .. })
        ));
        assert!(Board::new(10, 3_000_000_000).is_err());
    }

    #[test]
    fn test_get_is_bounds_checked() {
        let board = Board::new(10, 20).unwrap();
        assert_eq!(board.get(0, 0), Some(Cell::Empty));
        assert_eq!(board.get(9, 19), Some(Cell::Empty));
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(10, 0), None);
        assert_eq!(board.get(0, 20), None);
        assert_eq!(board.get(0, -1), None);
    }

    #[test]
    fn test_text_form_roundtrip() {
        let text = "....\n....\nT..I\nOOZ.";
        let parsed = board(text);
        assert_eq!(parsed.width(), 4);
        assert_eq!(parsed.height(), 4);
        assert_eq!(parsed.get(0, 2), Some(Cell::Filled(PieceKind::T)));
        assert_eq!(parsed.get(3, 2), Some(Cell::Filled(PieceKind::I)));
        assert_eq!(parsed.to_string(), text);
    }

    #[test]
    fn test_text_form_accepts_ids() {
        let parsed = board("0000\n0000\n0000\n1234");
        assert_eq!(parsed.get(0, 3), Some(Cell::Filled(PieceKind::I)));
        assert_eq!(parsed.get(3, 3), Some(Cell::Filled(PieceKind::O)));
        assert_eq!(parsed.rows().last().unwrap()[1].id(), 2);
    }

    #[test]
    fn test_text_form_errors() {
        assert_eq!("".parse::<Board>(), Err(BoardParseError::Empty));
        assert_eq!(
            "....\n...\n....\n....".parse::<Board>(),
            Err(BoardParseError::RaggedRow {
                row: 1,
                expected: 4,
                found: 3
            })
        );
        assert_eq!(
            "....\n..x.\n....\n....".parse::<Board>(),
            Err(BoardParseError::InvalidCell {
                ch: 'x',
                row: 1,
                column: 2
            })
        );
        assert_eq!("8...\n....\n....\n....".parse::<Board>().ok(), None);
        assert!(matches!(
            "..\n..".parse::<Board>(),
            Err(BoardParseError::Size(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let original = board("....\n.S..\nSS..\nS..J");
        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(json, r#"["....",".S..","SS..","S..J"]"#);
        let parsed: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);

        assert!(serde_json::from_str::<Board>(r#"["....","..."]"#).is_err());
    }

    #[test]
    fn test_collides_with_walls_and_floor() {
        let board = Board::new(10, 20).unwrap();
        let piece = Piece::spawn(PieceKind::O, 10);
        assert!(!board.collides(&piece));

        assert!(board.collides(&piece.moved(-5, 0)));
        assert!(!board.collides(&piece.moved(-4, 0)));
        assert!(board.collides(&piece.moved(5, 0)));
        assert!(!board.collides(&piece.moved(4, 0)));
        assert!(!board.collides(&piece.moved(0, 18)));
        assert!(board.collides(&piece.moved(0, 19)));
        assert!(board.collides(&piece.moved(0, -1)));
    }

    #[test]
    fn test_collides_ignores_empty_matrix_cells() {
        // The I matrix has empty rows above and below; only its cells count.
        let board = Board::new(10, 20).unwrap();
        let piece = Piece::new(PieceKind::I, PiecePosition::new(0, -1));
        assert!(!board.collides(&piece));
        let vertical = piece.rotated(RotationDirection::Clockwise);
        // Vertical I occupies column x + 2.
        assert!(!board.collides(&vertical.moved(-2, 1)));
        assert!(board.collides(&vertical.moved(-3, 1)));
    }

    #[test]
    fn test_collides_iff_cell_outside_or_on_locked_cell() {
        let board = board(
            "
            ..........
            ..........
            ..........
            ....Z.....
            ",
        );
        for kind in PieceKind::ALL {
            let mut piece = Piece::new(kind, PiecePosition::new(0, 0));
            for _ in 0..4 {
                for y in -3..6 {
                    for x in -3..12 {
                        let placed = piece.moved(x, y);
                        let expected = placed.occupied_positions().any(|(px, py)| {
                            !(0..10).contains(&px)
                                || !(0..4).contains(&py)
                                || (px, py) == (4, 3)
                        });
                        assert_eq!(board.collides(&placed), expected, "{placed:?}");
                    }
                }
                piece = piece.rotated(RotationDirection::Clockwise);
            }
        }
    }

    #[test]
    fn test_lock_copies_shape_ids() {
        let mut board = Board::new(10, 20).unwrap();
        let piece = Piece::spawn(PieceKind::T, 10).moved(0, 18);
        board.lock(&piece);
        assert_eq!(board.occupied_count(), 4);
        assert_eq!(board.get(4, 18), Some(Cell::Filled(PieceKind::T)));
        assert_eq!(board.get(3, 19), Some(Cell::Filled(PieceKind::T)));
        assert_eq!(board.get(5, 19).map(Cell::id), Some(6));
        assert_eq!(board.get(3, 18), Some(Cell::Empty));
    }

    #[test]
    fn test_sweep_no_full_rows() {
        let mut board = board("....\n....\nIII.\nOOO.");
        let before = board.clone();
        assert_eq!(board.sweep_full_rows(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_sweep_single_row_shifts_rows_above() {
        let mut board = board(
            "
            .....
            ..T..
            .JJ..
            LLLLL
            ",
        );
        assert_eq!(board.sweep_full_rows(), 1);
        assert_eq!(board.to_string(), ".....\n.....\n..T..\n.JJ..");
        assert_eq!(board.width(), 5);
        assert_eq!(board.height(), 4);
    }

    #[test]
    fn test_sweep_non_adjacent_rows() {
        let mut board = board(
            "
            .S...
            SSSSS
            .Z.Z.
            TTTTT
            ..O..
            IIIII
            ",
        );
        assert_eq!(board.sweep_full_rows(), 3);
        assert_eq!(board.to_string(), ".....\n.....\n.....\n.S...\n.Z.Z.\n..O..");
    }

    #[test]
    fn test_sweep_adjacent_rows_rechecks_shifted_row() {
        let mut board = board(
            "
            ....
            J...
            IIII
            IIII
            IIII
            IIII
            ",
        );
        assert_eq!(board.sweep_full_rows(), 4);
        assert_eq!(board.to_string(), "....\n....\n....\n....\n....\nJ...");
    }

    #[test]
    fn test_sweep_full_board() {
        let mut board = board("IIII\nOOOO\nTTTT\nZZZZ");
        assert_eq!(board.sweep_full_rows(), 4);
        assert_eq!(board.occupied_count(), 0);
    }

    #[test]
    fn test_lock_vertical_i_completes_bottom_row() {
        let mut rows = vec![".........."; 19];
        rows.push("ZZZZZZZZZ.");
        let mut board = board(&rows.join("\n"));
        *board.get_mut(0, 18).unwrap() = Cell::Filled(PieceKind::L);

        // Vertical I occupies matrix column 2; put it in board column 9 rows 16..=19.
        let piece = Piece::new(PieceKind::I, PiecePosition::new(7, 16))
            .rotated(RotationDirection::Clockwise);
        assert!(!board.collides(&piece));
        board.lock(&piece);

        assert_eq!(board.sweep_full_rows(), 1);
        assert_eq!(board.get(0, 19), Some(Cell::Filled(PieceKind::L)));
        assert_eq!(board.get(9, 19), Some(Cell::Filled(PieceKind::I)));
        assert_eq!(board.get(9, 17), Some(Cell::Filled(PieceKind::I)));
        assert_eq!(board.get(9, 16), Some(Cell::Empty));
        assert!(board.rows().next().unwrap().iter().all(|cell| cell.is_empty()));
        assert_eq!(board.occupied_count(), 4);
    }
}
