mod command;
mod high_score;
mod logging;
mod tui;
mod view;

fn main() -> anyhow::Result<()> {
    command::run()
}
