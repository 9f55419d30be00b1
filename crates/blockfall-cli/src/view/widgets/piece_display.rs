use blockfall_engine::PieceKind;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use super::BlockDisplay;

/// Preview of a piece in its spawn orientation, cropped to its filled cells.
#[derive(Debug)]
pub struct PieceDisplay<'a> {
    piece: Option<PieceKind>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceDisplay<'a> {
    pub fn new(piece: Option<PieceKind>) -> Self {
        Self { piece, block: None }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        4 * BlockDisplay::WIDTH + super::chrome(self.block.as_ref()).width
    }

    pub fn height(&self) -> u16 {
        2 * BlockDisplay::HEIGHT + super::chrome(self.block.as_ref()).height
    }
}

/// Filled cells of the spawn matrix, shifted so the bounding box starts at
/// the origin, along with the bounding box size.
fn cropped_cells(kind: PieceKind) -> (Vec<(usize, usize)>, (usize, usize)) {
    let matrix = kind.spawn_matrix();
    let cells = matrix.occupied_cells().collect::<Vec<_>>();
    let min_x = cells.iter().map(|&(x, _)| x).min().unwrap_or(0);
    let min_y = cells.iter().map(|&(_, y)| y).min().unwrap_or(0);
    let max_x = cells.iter().map(|&(x, _)| x).max().unwrap_or(0);
    let max_y = cells.iter().map(|&(_, y)| y).max().unwrap_or(0);
    let cells = cells
        .into_iter()
        .map(|(x, y)| (x - min_x, y - min_y))
        .collect();
    (cells, (max_x - min_x + 1, max_y - min_y + 1))
}

impl Widget for PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let Some(kind) = self.piece else {
            return;
        };
        let (cells, (w, h)) = cropped_cells(kind);
        let piece_area = area.centered(
            Constraint::Length(super::cells(w) * BlockDisplay::WIDTH),
            Constraint::Length(super::cells(h) * BlockDisplay::HEIGHT),
        );

        let horizontal =
            Layout::horizontal((0..w).map(|_| Constraint::Length(BlockDisplay::WIDTH)))
                .flex(Flex::Center);
        let vertical = Layout::vertical((0..h).map(|_| Constraint::Length(BlockDisplay::HEIGHT)));
        let grid = piece_area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal))
            .collect::<Vec<_>>();

        let filled = BlockDisplay::piece(kind);
        for (x, y) in cells {
            if let Some(grid_cell) = grid.get(y).and_then(|row| row.get(x)) {
                filled.render(*grid_cell, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cropped_cells() {
        let (cells, size) = cropped_cells(PieceKind::I);
        assert_eq!(size, (4, 1));
        assert_eq!(cells, [(0, 0), (1, 0), (2, 0), (3, 0)]);

        let (cells, size) = cropped_cells(PieceKind::T);
        assert_eq!(size, (3, 2));
        assert_eq!(cells.len(), 4);
        assert!(cells.contains(&(1, 0)));

        for kind in PieceKind::ALL {
            let (_, (w, h)) = cropped_cells(kind);
            assert!(w <= 4 && h <= 2, "{kind} does not fit the preview");
        }
    }
}
