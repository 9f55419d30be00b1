use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging;

use self::{play::PlayArg, scores::ScoresArg};

mod play;
mod scores;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Write engine and host logs to this file (filtered by `RUST_LOG`, default `info`)
    #[clap(long, global = true)]
    log_file: Option<PathBuf>,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal (default)
    Play(#[clap(flatten)] PlayArg),
    /// Print the high-score table
    Scores(#[clap(flatten)] ScoresArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    logging::init(args.log_file.as_deref())?;
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Scores(arg) => scores::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_play() {
        let args = CommandArgs::try_parse_from(["blockfall"]).unwrap();
        assert!(args.mode.is_none());
        assert!(args.log_file.is_none());
    }

    #[test]
    fn test_parse_play_options() {
        let args = CommandArgs::try_parse_from([
            "blockfall",
            "play",
            "--seed",
            "0123456789abcdef0123456789abcdef",
            "--log-file",
            "game.log",
        ])
        .unwrap();
        assert_eq!(args.log_file, Some(PathBuf::from("game.log")));
        let Some(Mode::Play(arg)) = args.mode else {
            panic!("expected play mode");
        };
        assert_eq!(
            arg.seed.unwrap().to_string(),
            "0123456789abcdef0123456789abcdef"
        );
    }

    #[test]
    fn test_rejects_bad_seed() {
        assert!(CommandArgs::try_parse_from(["blockfall", "play", "--seed", "xyz"]).is_err());
    }

    #[test]
    fn test_parse_scores_limit() {
        let args = CommandArgs::try_parse_from(["blockfall", "scores", "--limit", "3"]).unwrap();
        let Some(Mode::Scores(arg)) = args.mode else {
            panic!("expected scores mode");
        };
        assert_eq!(arg.limit, 3);
    }
}
