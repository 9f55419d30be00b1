use serde::{Deserialize, Serialize};

use crate::{Board, ConfigError};

use super::scoring::ScoringPolicy;

/// Settings for a [`GameSession`](super::GameSession).
///
/// Every field has a default, so a configuration file only needs the values
/// it changes:
///
/// ```
/// use blockfall_engine::GameConfig;
///
/// let config: GameConfig =
///     serde_json::from_str(r#"{ "board_height": 24, "scoring": { "lines_per_level": 5 } }"#)
///         .unwrap();
/// assert_eq!(config.board_width, 10);
/// assert_eq!(config.board_height, 24);
/// assert_eq!(config.scoring.lines_per_level, 5);
/// assert_eq!(config.scoring.min_drop_interval_ms, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub board_width: usize,
    pub board_height: usize,
    pub scoring: ScoringPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 10,
            board_height: 20,
            scoring: ScoringPolicy::default(),
        }
    }
}

impl GameConfig {
    /// Checks the board dimensions and the scoring policy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Board::check_size(self.board_width, self.board_height)?;
        self.scoring.validate()
    }

    /// Creates the empty board described by this configuration.
    pub fn new_board(&self) -> Result<Board, ConfigError> {
        Board::new(self.board_width, self.board_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_small_board() {
        let config = GameConfig {
            board_width: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BoardTooSmall { width: 0, .. })
        ));
        assert!(config.new_board().is_err());
    }

    #[test]
    fn test_rejects_huge_board() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "board_width": 3000000000 }"#).unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigError::BoardTooLarge {
                width: 3_000_000_000,
                height: 20,
                max: Board::MAX_SIZE,
            })
        );
        assert!(config.new_board().is_err());

        let config = GameConfig {
            board_width: usize::MAX / 2 + 1,
            board_height: 4,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BoardTooLarge { .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(serde_json::from_str::<GameConfig>(r#"{ "board_depth": 3 }"#).is_err());
        assert!(serde_json::from_str::<GameConfig>(r#"{ "scoring": { "speed": 3 } }"#).is_err());
    }

    #[test]
    fn test_roundtrip() {
        let config = GameConfig {
            board_width: 12,
            ..GameConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<GameConfig>(&json).unwrap(), config);
    }
}
