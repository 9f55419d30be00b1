use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use blockfall_engine::{GameConfig, GameSession, PieceSeed};

use crate::{
    high_score::{self, HighScoreTable},
    tui::Runtime,
};

use self::app::PlayApp;

mod app;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Game configuration file (JSON); missing fields use defaults
    #[clap(long)]
    config: Option<PathBuf>,
    /// Fix the piece sequence with a 32-digit hex seed
    #[clap(long)]
    pub(crate) seed: Option<PieceSeed>,
    /// High score file (JSON)
    #[clap(long, default_value = high_score::DEFAULT_PATH)]
    high_scores: PathBuf,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            config: None,
            seed: None,
            high_scores: PathBuf::from(high_score::DEFAULT_PATH),
        }
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        config,
        seed,
        high_scores,
    } = arg;

    let config = match config {
        Some(path) => read_config_file(path)?,
        None => GameConfig::default(),
    };
    let session = match seed {
        Some(seed) => GameSession::with_seed(config, *seed),
        None => GameSession::new(config),
    }
    .context("Invalid game configuration")?;
    let table = HighScoreTable::load(high_scores)?;

    let mut app = PlayApp::new(session, table, high_scores.clone());
    Runtime::new().run(&mut app).context("Terminal error")?;
    Ok(())
}

fn read_config_file(path: &Path) -> anyhow::Result<GameConfig> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open config file: {}", path.display()))?;
    let reader = BufReader::new(file);
    let config: GameConfig = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    tracing::info!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_read_partial_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "board_width": 12 }"#).unwrap();
        let config = read_config_file(&path).unwrap();
        assert_eq!(config.board_width, 12);
        assert_eq!(config.board_height, 20);
    }

    #[test]
    fn test_read_invalid_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "board_width": 2 }"#).unwrap();
        let err = read_config_file(&path).unwrap_err();
        assert!(err.to_string().starts_with("Invalid config file"));

        let err = read_config_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to open config file"));
    }
}
