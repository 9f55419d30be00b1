use std::{
    io::{self, Write as _},
    path::PathBuf,
};

use anyhow::Context as _;

use crate::high_score::{self, HighScoreEntry, HighScoreTable};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ScoresArg {
    /// Number of entries to print
    #[clap(long, default_value_t = 10)]
    pub(crate) limit: usize,
    /// High score file (JSON)
    #[clap(long, default_value = high_score::DEFAULT_PATH)]
    high_scores: PathBuf,
}

pub(crate) fn run(arg: &ScoresArg) -> anyhow::Result<()> {
    let ScoresArg { limit, high_scores } = arg;

    let table = HighScoreTable::load(high_scores)?;
    let mut stdout = io::stdout().lock();
    write_table(&mut stdout, table.top(*limit)).context("Failed to write to stdout")?;
    Ok(())
}

fn write_table<W>(writer: &mut W, entries: &[HighScoreEntry]) -> io::Result<()>
where
    W: io::Write,
{
    if entries.is_empty() {
        writeln!(writer, "No high scores yet.")?;
        return Ok(());
    }
    let name_width = entries
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());
    writeln!(writer, "RANK  {:<name_width$}  {:>10}  DATE", "NAME", "SCORE")?;
    for (i, entry) in entries.iter().enumerate() {
        writeln!(
            writer,
            "{:>4}  {:<name_width$}  {:>10}  {}",
            i + 1,
            entry.name,
            entry.score,
            entry.date
        )?;
    }
    Ok(())
}
