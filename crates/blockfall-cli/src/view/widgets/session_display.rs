use blockfall_engine::{SessionSnapshot, SessionState};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::high_score::HighScoreEntry;

use super::{BoardDisplay, HighScoreDisplay, PieceDisplay, SessionStatsDisplay, palette};

/// Full game screen drawn from one [`SessionSnapshot`]: stats, board, next
/// piece and high scores.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    snapshot: &'a SessionSnapshot,
    high_scores: &'a [HighScoreEntry],
    highlight: Option<usize>,
    name_prompt: Option<&'a str>,
}

impl<'a> SessionDisplay<'a> {
    pub fn new(snapshot: &'a SessionSnapshot, high_scores: &'a [HighScoreEntry]) -> Self {
        Self {
            snapshot,
            high_scores,
            highlight: None,
            name_prompt: None,
        }
    }

    pub fn highlight(self, rank: Option<usize>) -> Self {
        Self {
            highlight: rank,
            ..self
        }
    }

    /// Shows a name prompt with the text typed so far over the board.
    pub fn name_prompt(self, name: Option<&'a str>) -> Self {
        Self {
            name_prompt: name,
            ..self
        }
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block_padding = Padding::symmetric(1, 0);
        let snapshot = self.snapshot;
        let border_style = palette::frame(snapshot.state);
        let panel = |title: &'static str| {
            Block::bordered()
                .title(Line::from(title).centered())
                .padding(block_padding)
                .border_style(border_style)
                .style(palette::TEXT_STYLE)
        };

        let game_board = BoardDisplay::new(&snapshot.board)
            .ghost(snapshot.ghost_piece)
            .active_piece(snapshot.active_piece)
            .block(Block::bordered().border_style(border_style).style(palette::TEXT_STYLE));
        let next_panel = PieceDisplay::new(snapshot.next_piece).block(panel("NEXT"));
        let session_stats = SessionStatsDisplay::new(snapshot).block(panel("STATS"));
        let high_scores = HighScoreDisplay::new(self.high_scores)
            .highlight(self.highlight)
            .block(panel("HIGH SCORES"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(session_stats.width()),
            Constraint::Length(game_board.width()),
            Constraint::Length(u16::max(next_panel.width(), high_scores.width())),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [stats_area] =
            Layout::vertical([Constraint::Length(session_stats.height())]).areas(left_column);
        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);
        let [next_area, high_score_area] = Layout::vertical([
            Constraint::Length(next_panel.height()),
            Constraint::Length(high_scores.height()),
        ])
        .spacing(1)
        .areas(right_column);
        let next_area = next_area.layout::<1>(
            &Layout::horizontal([Constraint::Length(next_panel.width())]).flex(Flex::Start),
        )[0];

        let game_board_width = game_board.width();
        session_stats.render(stats_area, buf);
        game_board.render(board_area, buf);
        next_panel.render(next_area, buf);
        high_scores.render(high_score_area, buf);

        let popup_lines = match (snapshot.state, self.name_prompt) {
            (SessionState::Paused, _) => vec![Line::from("PAUSED")],
            (SessionState::GameOver, Some(name)) => vec![
                Line::from("GAME OVER!!"),
                Line::from(format!("SCORE {}", snapshot.score)),
                Line::from(format!("NAME: {name}_")),
            ],
            (SessionState::GameOver, None) => vec![Line::from("GAME OVER!!")],
            (SessionState::Idle | SessionState::Running, _) => vec![],
        };
        let popup = palette::popup(snapshot.state).map(|style| (popup_lines, style));

        if let Some((lines, style)) = popup {
            let height = super::cells(lines.len());
            let block = Block::new().style(style);
            let text = Text::from(lines).style(style).centered();
            let area = board_area.centered(
                Constraint::Length(game_board_width),
                Constraint::Length(height + 2),
            );
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(height)), buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use blockfall_engine::{GameConfig, GameSession, PieceSeed};

    use super::*;

    fn screen_text(display: &SessionDisplay<'_>) -> String {
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_renders_snapshot() {
        let mut session =
            GameSession::with_seed(GameConfig::default(), PieceSeed::from_bytes([5; 16])).unwrap();
        session.start().unwrap();
        let snapshot = session.snapshot();
        let text = screen_text(&SessionDisplay::new(&snapshot, &[]));
        assert!(text.contains("NEXT"));
        assert!(text.contains("no scores yet"));
        assert!(!text.contains("PAUSED"));

        session.pause().unwrap();
        let snapshot = session.snapshot();
        assert!(screen_text(&SessionDisplay::new(&snapshot, &[])).contains("PAUSED"));
    }

    #[test]
    fn test_name_prompt_over_game_over() {
        let mut session =
            GameSession::with_seed(GameConfig::default(), PieceSeed::from_bytes([5; 16])).unwrap();
        session.start().unwrap();
        let mut snapshot = session.snapshot();
        snapshot.state = SessionState::GameOver;
        snapshot.is_over = true;
        snapshot.score = 1200;
        let text = screen_text(&SessionDisplay::new(&snapshot, &[]).name_prompt(Some("ada")));
        assert!(text.contains("GAME OVER!!"));
        assert!(text.contains("SCORE 1200"));
        assert!(text.contains("NAME: ada_"));
    }
}
