use ratatui::{
    layout::{Rect, Size},
    widgets::Block as BlockWidget,
};

pub use self::{
    block_display::*, board_display::*, high_score_display::*, key_binding_display::*,
    piece_display::*, session_display::*, session_stats_display::*,
};

mod block_display;
mod board_display;
mod high_score_display;
mod key_binding_display;
mod piece_display;
mod session_display;
mod session_stats_display;

mod palette {
    use blockfall_engine::{PieceKind, SessionState};
    use ratatui::style::{Color, Style};

    pub const BACKGROUND: Color = Color::Black;
    pub const TEXT: Color = Color::White;

    pub const TEXT_STYLE: Style = Style::new().fg(TEXT).bg(BACKGROUND);
    pub const MUTED_STYLE: Style = Style::new().fg(Color::DarkGray).bg(BACKGROUND);
    pub const ACCENT_STYLE: Style = Style::new().fg(Color::Yellow).bg(BACKGROUND);
    pub const VOID_STYLE: Style = Style::new().fg(BACKGROUND).bg(BACKGROUND);

    pub const fn piece(kind: PieceKind) -> Color {
        match kind {
            PieceKind::I => Color::Cyan,
            PieceKind::O => Color::Yellow,
            PieceKind::T => Color::Magenta,
            PieceKind::S => Color::Green,
            PieceKind::Z => Color::Red,
            PieceKind::J => Color::Blue,
            PieceKind::L => Color::Rgb(255, 127, 0),
        }
    }

    /// Border color for each session state.
    pub const fn frame(state: SessionState) -> Color {
        match state {
            SessionState::Idle | SessionState::Running => TEXT,
            SessionState::Paused => Color::Yellow,
            SessionState::GameOver => Color::Red,
        }
    }

    /// Colors of the popup drawn over the board, if the state has one.
    pub const fn popup(state: SessionState) -> Option<Style> {
        match state {
            SessionState::Paused => Some(Style::new().fg(BACKGROUND).bg(Color::Yellow)),
            SessionState::GameOver => Some(Style::new().fg(TEXT).bg(Color::Red)),
            SessionState::Idle | SessionState::Running => None,
        }
    }
}

/// Columns and rows taken by the optional border block around a widget.
fn chrome(block: Option<&BlockWidget>) -> Size {
    let outer = Rect::new(0, 0, 64, 64);
    let inner = block.map_or(outer, |block| block.inner(outer));
    Size::new(outer.width - inner.width, outer.height - inner.height)
}

/// Converts a cell count to terminal units, saturating on absurd sizes.
fn cells(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use ratatui::widgets::Padding;

    use super::*;

    #[test]
    fn test_chrome() {
        assert_eq!(chrome(None), Size::new(0, 0));
        assert_eq!(chrome(Some(&BlockWidget::bordered())), Size::new(2, 2));
        let padded = BlockWidget::bordered().padding(Padding::symmetric(1, 0));
        assert_eq!(chrome(Some(&padded)), Size::new(4, 2));
    }
}
