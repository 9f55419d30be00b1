use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write as _},
    path::Path,
};

use anyhow::Context as _;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default location of the high score file.
pub const DEFAULT_PATH: &str = "./data/high_scores.json";

/// Name recorded when the player leaves the prompt empty.
pub const DEFAULT_NAME: &str = "Anonymous";

/// Number of entries shown next to the board.
pub const DISPLAY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
    pub date: NaiveDate,
}

impl HighScoreEntry {
    /// Creates an entry, trimming `name` and falling back to [`DEFAULT_NAME`].
    pub fn new(name: &str, score: u64, date: NaiveDate) -> Self {
        let name = match name.trim() {
            "" => DEFAULT_NAME,
            name => name,
        };
        Self {
            name: name.to_owned(),
            score,
            date,
        }
    }
}

/// High scores sorted by score, highest first.
///
/// Stored on disk as a JSON array of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScoreTable {
    entries: Vec<HighScoreEntry>,
}

impl HighScoreTable {
    /// Loads the table from `path`; a missing file is an empty table.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = File::open(path)
            .with_context(|| format!("Failed to open high score file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut table: Self = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse high score file: {}", path.display()))?;
        table.entries.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(table)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create high score file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("Failed to write high score file: {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush high score file: {}", path.display()))?;
        Ok(())
    }

    /// Inserts `entry` after every entry with an equal or higher score and
    /// returns its zero-based rank.
    pub fn insert(&mut self, entry: HighScoreEntry) -> usize {
        let rank = self.entries.partition_point(|e| e.score >= entry.score);
        self.entries.insert(rank, entry);
        rank
    }

    pub fn top(&self, n: usize) -> &[HighScoreEntry] {
        &self.entries[..n.min(self.entries.len())]
    }
}
