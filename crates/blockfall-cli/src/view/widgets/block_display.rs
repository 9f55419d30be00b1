use blockfall_engine::{Cell, PieceKind};
use ratatui::{
    prelude::{Buffer, Rect},
    style::Style,
    widgets::{Paragraph, Widget},
};

use super::palette;

/// One board cell, two terminal columns wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockDisplay {
    style: Style,
    symbol: &'static str,
}

impl BlockDisplay {
    pub const WIDTH: u16 = 2;
    pub const HEIGHT: u16 = 1;

    const fn new(style: Style, symbol: &'static str) -> Self {
        Self { style, symbol }
    }

    pub const fn empty(show_dots: bool) -> Self {
        if show_dots {
            Self::new(palette::MUTED_STYLE, ".")
        } else {
            Self::new(palette::VOID_STYLE, "")
        }
    }

    pub const fn ghost() -> Self {
        Self::new(palette::MUTED_STYLE, "[]")
    }

    pub const fn piece(kind: PieceKind) -> Self {
        let color = palette::piece(kind);
        Self::new(Style::new().fg(color).bg(color), "")
    }

    pub const fn from_cell(cell: Cell, show_dots: bool) -> Self {
        match cell {
            Cell::Empty => Self::empty(show_dots),
            Cell::Filled(kind) => Self::piece(kind),
        }
    }
}

impl Widget for BlockDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BlockDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Paragraph fills the whole area, not just the cells with the symbol
        Paragraph::new(self.symbol)
            .style(self.style)
            .centered()
            .render(area, buf);
    }
}
