use std::time::Duration;

use serde::Serialize;

use super::scoring::{ScoreUpdate, ScoringPolicy};

/// Game statistics tracking score, level, lines cleared, and piece count.
///
/// - **Score**: points from line clears, multiplied by the level at clear time
/// - **Level**: starts at 1, raised by the [`ScoringPolicy`]
/// - **Drop interval**: auto-drop period for the current level
/// - **Completed pieces**: total number of pieces locked
/// - **Line clear distribution**: count of 0/1/2/3/4-row locks
///
/// Score and level never decrease and the drop interval never increases.
///
/// # Example
///
/// ```
/// use blockfall_engine::{GameStats, ScoringPolicy};
///
/// let policy = ScoringPolicy::default();
/// let mut stats = GameStats::new(&policy);
/// stats.complete_piece_drop(4, &policy);
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    score: u64,
    level: u64,
    total_cleared_lines: u64,
    completed_pieces: u64,
    line_cleared_counter: [u64; 5],
    #[serde(rename = "drop_interval_ms", serialize_with = "serialize_millis")]
    drop_interval: Duration,
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

impl GameStats {
    /// Creates statistics for a new session: level 1, everything else at zero.
    #[must_use]
    pub fn new(policy: &ScoringPolicy) -> Self {
        Self {
            score: 0,
            level: ScoringPolicy::INITIAL_LEVEL,
            total_cleared_lines: 0,
            completed_pieces: 0,
            line_cleared_counter: [0; 5],
            drop_interval: policy.drop_interval(ScoringPolicy::INITIAL_LEVEL),
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub const fn level(&self) -> u64 {
        self.level
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> u64 {
        self.total_cleared_lines
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> u64 {
        self.completed_pieces
    }

    /// Returns a histogram of locks by rows cleared.
    ///
    /// Index 0 counts locks that cleared nothing; index 4 counts clears of
    /// four or more rows.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[u64; 5] {
        &self.line_cleared_counter
    }

    /// Current auto-drop interval.
    #[must_use]
    pub const fn drop_interval(&self) -> Duration {
        self.drop_interval
    }

    /// Records one locked piece that cleared `cleared_lines` rows.
    pub fn complete_piece_drop(
        &mut self,
        cleared_lines: usize,
        policy: &ScoringPolicy,
    ) -> ScoreUpdate {
        let update = policy.apply_clear(cleared_lines, self.level, self.total_cleared_lines);
        self.completed_pieces += 1;
        self.line_cleared_counter[cleared_lines.min(4)] += 1;
        self.score = self.score.saturating_add(update.score_delta);
        self.level = update.level;
        self.total_cleared_lines = update.total_cleared_lines;
        self.drop_interval = update.drop_interval;
        update
    }
}
