use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Rules mapping line clears to score, level and drop speed.
///
/// The defaults are:
///
/// | Rows cleared | Points (× level) |
/// |---|---|
/// | 0 | 0 |
/// | 1 | 100 |
/// | 2 | 300 |
/// | 3 | 500 |
/// | 4 | 800 |
///
/// The level starts at 1 and goes up by one once the session's total
/// cleared lines reach `level * lines_per_level`. Every level shortens the
/// auto-drop interval by `drop_interval_step_ms`, never going below
/// `min_drop_interval_ms`.
///
/// # Example
///
/// ```
/// use blockfall_engine::ScoringPolicy;
///
/// let policy = ScoringPolicy::default();
/// let update = policy.apply_clear(4, 1, 8);
/// assert_eq!(update.score_delta, 800);
/// assert_eq!(update.level, 2);
/// assert_eq!(update.drop_interval.as_millis(), 900);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringPolicy {
    /// Points for clearing 0, 1, 2, 3 and 4 rows at once, before the level multiplier.
    pub line_clear_points: [u64; 5],
    pub lines_per_level: u64,
    pub initial_drop_interval_ms: u64,
    pub drop_interval_step_ms: u64,
    pub min_drop_interval_ms: u64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            line_clear_points: [0, 100, 300, 500, 800],
            lines_per_level: 10,
            initial_drop_interval_ms: 1000,
            drop_interval_step_ms: 100,
            min_drop_interval_ms: 100,
        }
    }
}

/// Result of applying one sweep to the scoring state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub score_delta: u64,
    pub level: u64,
    pub total_cleared_lines: u64,
    pub drop_interval: Duration,
    pub leveled_up: bool,
}

impl ScoringPolicy {
    /// Level of a freshly started session.
    pub const INITIAL_LEVEL: u64 = 1;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lines_per_level == 0 {
            return Err(ConfigError::ZeroLinesPerLevel);
        }
        if self.min_drop_interval_ms == 0 {
            return Err(ConfigError::ZeroMinDropInterval);
        }
        if self.initial_drop_interval_ms < self.min_drop_interval_ms {
            return Err(ConfigError::InitialBelowMinDropInterval {
                initial_ms: self.initial_drop_interval_ms,
                min_ms: self.min_drop_interval_ms,
            });
        }
        Ok(())
    }

    /// Auto-drop interval at `level`, floored at the minimum interval.
    #[must_use]
    pub fn drop_interval(&self, level: u64) -> Duration {
        let reduction = level
            .saturating_sub(Self::INITIAL_LEVEL)
            .saturating_mul(self.drop_interval_step_ms);
        let millis = self
            .initial_drop_interval_ms
            .saturating_sub(reduction)
            .max(self.min_drop_interval_ms);
        Duration::from_millis(millis)
    }

    /// Points for clearing `cleared_lines` rows at `level`.
    ///
    /// Clears beyond the table's last entry score as the last entry.
    #[must_use]
    pub fn points(&self, cleared_lines: usize, level: u64) -> u64 {
        let last = self.line_clear_points.len() - 1;
        self.line_clear_points[cleared_lines.min(last)].saturating_mul(level)
    }

    /// Computes the effect of one sweep that cleared `cleared_lines` rows.
    ///
    /// Pure function of the current level and line total. The level rises by
    /// at most one per sweep, and only when the sweep cleared something.
    #[must_use]
    pub fn apply_clear(
        &self,
        cleared_lines: usize,
        level: u64,
        total_cleared_lines: u64,
    ) -> ScoreUpdate {
        let score_delta = self.points(cleared_lines, level);
        let total_cleared_lines = total_cleared_lines.saturating_add(cleared_lines as u64);
        let leveled_up = cleared_lines > 0
            && total_cleared_lines >= level.saturating_mul(self.lines_per_level);
        let level = if leveled_up {
            level.saturating_add(1)
        } else {
            level
        };
        ScoreUpdate {
            score_delta,
            level,
            total_cleared_lines,
            drop_interval: self.drop_interval(level),
            leveled_up,
        }
    }
}
