use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::high_score::{DISPLAY_LIMIT, HighScoreEntry};

use super::palette;

/// Ranked list of the best scores.
pub struct HighScoreDisplay<'a> {
    entries: &'a [HighScoreEntry],
    highlight: Option<usize>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> HighScoreDisplay<'a> {
    pub fn new(entries: &'a [HighScoreEntry]) -> Self {
        Self {
            entries,
            highlight: None,
            block: None,
        }
    }

    /// Marks the entry at `rank` (zero-based), e.g. the one just saved.
    pub fn highlight(self, rank: Option<usize>) -> Self {
        Self {
            highlight: rank,
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
        24 + super::chrome(self.block.as_ref()).width
    }

    pub fn height(&self) -> u16 {
        super::cells(DISPLAY_LIMIT) + super::chrome(self.block.as_ref()).height
    }
}

impl Widget for HighScoreDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        if self.entries.is_empty() {
            Line::styled("no scores yet", palette::MUTED_STYLE)
                .centered()
                .render(area, buf);
            return;
        }

        let rows = Layout::vertical((0..DISPLAY_LIMIT).map(|_| Constraint::Length(1))).split(area);
        for (i, (entry, area)) in self.entries.iter().zip(rows.iter()).enumerate() {
            let [name_area, score_area] = area.layout(&Layout::horizontal([
                Constraint::Fill(1),
                Constraint::Length(8),
            ]));
            let style = if self.highlight == Some(i) {
                palette::ACCENT_STYLE
            } else {
                palette::TEXT_STYLE
            };
            let name: String = entry.name.chars().take(12).collect();
            Line::styled(format!("{}. {name}", i + 1), style)
                .left_aligned()
                .render(name_area, buf);
            Line::styled(entry.score.to_string(), style)
                .right_aligned()
                .render(score_area, buf);
        }
    }
}
