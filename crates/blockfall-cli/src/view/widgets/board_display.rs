use std::iter;

use blockfall_engine::{Board, Piece};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt, Widget},
};

use super::BlockDisplay;

/// The board with its locked cells, plus the ghost and active piece drawn on top.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    board: &'a Board,
    ghost: Option<Piece>,
    active_piece: Option<Piece>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self {
            board,
            ghost: None,
            active_piece: None,
            block: None,
        }
    }

    pub fn ghost(self, piece: Option<Piece>) -> Self {
        Self {
            ghost: piece,
            ..self
        }
    }

    pub fn active_piece(self, piece: Option<Piece>) -> Self {
        Self {
            active_piece: piece,
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        super::cells(self.board.width()).saturating_mul(BlockDisplay::WIDTH)
            + super::chrome(self.block.as_ref()).width
    }

    pub fn height(&self) -> u16 {
        super::cells(self.board.height()).saturating_mul(BlockDisplay::HEIGHT)
            + super::chrome(self.block.as_ref()).height
    }

    /// Locked cells overlaid with the ghost, then the active piece.
    fn compose(&self) -> Vec<BlockDisplay> {
        let width = self.board.width();
        let height = self.board.height();
        let mut grid = self
            .board
            .rows()
            .flatten()
            .map(|cell| BlockDisplay::from_cell(*cell, true))
            .collect::<Vec<_>>();
        let overlays = [
            self.ghost.map(|piece| (piece, BlockDisplay::ghost())),
            self.active_piece
                .map(|piece| (piece, BlockDisplay::piece(piece.kind()))),
        ];
        for (piece, display) in overlays.into_iter().flatten() {
            for (x, y) in piece.occupied_positions() {
                if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y))
                    && x < width
                    && y < height
                {
                    grid[y * width + x] = display;
                }
            }
        }
        grid
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let width = self.board.width();
        let col_constraints = (0..width).map(|_| Constraint::Length(BlockDisplay::WIDTH));
        let row_constraints =
            (0..self.board.height()).map(|_| Constraint::Length(BlockDisplay::HEIGHT));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        let grid = self.compose();
        for (grid_row, row) in iter::zip(grid_cells, grid.chunks_exact(width)) {
            for (grid_cell, display) in iter::zip(grid_row, row) {
                display.render(grid_cell, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use blockfall_engine::{PieceKind, PiecePosition};

    use super::*;

    #[test]
    fn test_compose_layers() {
        let board: Board = "
            ....
            ....
            ....
            .OO.
        "
        .parse()
        .unwrap();
        let active = Piece::new(PieceKind::I, PiecePosition::new(0, -1));
        let ghost = active.ghost_position(&board);
        let display = BoardDisplay::new(&board)
            .ghost(Some(ghost))
            .active_piece(Some(active));
        let grid = display.compose();
        assert_eq!(grid[0], BlockDisplay::piece(PieceKind::I));
        assert_eq!(grid[3], BlockDisplay::piece(PieceKind::I));
        assert_eq!(grid[2 * 4], BlockDisplay::ghost());
        assert_eq!(grid[4], BlockDisplay::empty(true));
        assert_eq!(grid[3 * 4 + 1], BlockDisplay::piece(PieceKind::O));
        assert_eq!(display.width(), 8);
        assert_eq!(display.height(), 4);
    }
}
