use std::fmt::Display;

use blockfall_engine::SessionSnapshot;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block as BlockWidget, BlockExt as _, Paragraph, Widget},
};

use super::palette;

const INNER_WIDTH: u16 = 20;
const LINE_COUNT: u16 = 12;
const BAR: &str = "■";

/// Score, level, line total and drop speed, followed by a histogram of
/// how many rows each clear removed.
pub struct SessionStatsDisplay<'a> {
    snapshot: &'a SessionSnapshot,
    block: Option<BlockWidget<'a>>,
}

impl<'a> SessionStatsDisplay<'a> {
    pub fn new(snapshot: &'a SessionSnapshot) -> Self {
        Self {
            snapshot,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        INNER_WIDTH + super::chrome(self.block.as_ref()).width
    }

    pub fn height(&self) -> u16 {
        LINE_COUNT + super::chrome(self.block.as_ref()).height
    }

    fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let snapshot = self.snapshot;
        let mut lines = vec![
            Line::from("SCORE"),
            Line::styled(snapshot.score.to_string(), palette::ACCENT_STYLE).right_aligned(),
            Line::default(),
            field("LEVEL", snapshot.level, width),
            field("LINES", snapshot.total_cleared_lines, width),
            field(
                "SPEED",
                format!("{}ms", snapshot.drop_interval.as_millis()),
                width,
            ),
            Line::default(),
            Line::from("CLEARS"),
        ];

        let clears = &snapshot.line_clears[1..];
        let most = clears.iter().copied().max().unwrap_or(0);
        for (rows, &count) in (1..).zip(clears) {
            let label = format!("{rows}x ");
            let count_text = count.to_string();
            let room = width.saturating_sub(label.len() + count_text.len() + 1);
            let bar = BAR.repeat(bar_len(count, most, room));
            let gap = room - bar.chars().count() + 1;
            lines.push(Line::from(vec![
                Span::raw(label),
                Span::styled(bar, palette::ACCENT_STYLE),
                Span::raw(" ".repeat(gap)),
                Span::raw(count_text),
            ]));
        }
        lines
    }
}

/// `label` on the left and `value` flush right within `width` columns.
fn field(label: &'static str, value: impl Display, width: usize) -> Line<'static> {
    let value = value.to_string();
    let gap = width.saturating_sub(label.len() + value.len()).max(1);
    Line::from(vec![
        Span::raw(label),
        Span::raw(" ".repeat(gap)),
        Span::raw(value),
    ])
}

/// Bar length for `count` when the largest count fills `room` columns.
///
/// Any non-zero count gets at least one column.
fn bar_len(count: u64, most: u64, room: usize) -> usize {
    if most == 0 || room == 0 {
        return 0;
    }
    let room_wide = u128::try_from(room).unwrap_or(u128::MAX);
    let len = u128::from(count)
        .saturating_mul(room_wide)
        .div_ceil(u128::from(most));
    usize::try_from(len).map_or(room, |len| len.min(room))
}

impl Widget for SessionStatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);
        Paragraph::new(self.lines(usize::from(area.width)))
            .style(palette::TEXT_STYLE)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use blockfall_engine::{GameConfig, GameSession, PieceSeed};

    use super::*;

    fn snapshot() -> SessionSnapshot {
        let mut session =
            GameSession::with_seed(GameConfig::default(), PieceSeed::from_bytes([9; 16])).unwrap();
        session.start().unwrap();
        let mut snapshot = session.snapshot();
        snapshot.score = 2400;
        snapshot.level = 3;
        snapshot.total_cleared_lines = 21;
        snapshot.line_clears = [30, 5, 0, 2, 2];
        snapshot
    }

    #[test]
    fn test_bar_len() {
        assert_eq!(bar_len(0, 0, 10), 0);
        assert_eq!(bar_len(5, 5, 10), 10);
        assert_eq!(bar_len(1, 100, 10), 1);
        assert_eq!(bar_len(0, 5, 10), 0);
        assert_eq!(bar_len(2, 5, 10), 4);
        assert_eq!(bar_len(u64::MAX, u64::MAX, 3), 3);
    }

    #[test]
    fn test_lines() {
        let snapshot = snapshot();
        let display = SessionStatsDisplay::new(&snapshot);
        let width = usize::from(INNER_WIDTH);
        let lines = display.lines(width);
        assert_eq!(lines.len(), usize::from(LINE_COUNT));

        assert_eq!(lines[1].to_string(), "2400");
        assert_eq!(lines[3].to_string(), format!("LEVEL{}3", " ".repeat(14)));
        assert_eq!(lines[5].to_string(), format!("SPEED{}1000ms", " ".repeat(9)));
        for line in &lines[3..6] {
            assert_eq!(line.width(), width);
        }

        let bars = lines[8..]
            .iter()
            .map(|line| line.to_string().matches(BAR).count())
            .collect::<Vec<_>>();
        assert_eq!(bars, [15, 0, 6, 6]);
        assert!(lines[8].to_string().starts_with("1x "));
        assert!(lines[8].to_string().ends_with(" 5"));
        assert_eq!(lines[8].width(), width);
    }

    #[test]
    fn test_render() {
        let snapshot = snapshot();
        let display = SessionStatsDisplay::new(&snapshot).block(BlockWidget::bordered());
        let area = Rect::new(0, 0, display.width(), display.height());
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);
        let text = buf
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>();
        assert!(text.contains("SCORE"));
        assert!(text.contains("2400"));
        assert!(text.contains("CLEARS"));
    }
}
