use std::time::Duration;

use crossterm::event::Event;
use ratatui::Frame;

use super::Runtime;

/// Trait for TUI applications.
///
/// Applications executed by [`Runtime::run`] must implement this trait.
pub trait App {
    /// Called once before the first event. Use this to configure tick and frame rates.
    fn init(&mut self, runtime: &mut Runtime);

    fn should_exit(&self) -> bool;

    /// Handles terminal events (key input, resize, etc.).
    fn handle_event(&mut self, runtime: &mut Runtime, event: Event);

    fn draw(&self, frame: &mut Frame);

    /// Advances the application by `elapsed`, the time since the previous
    /// tick (or since the last [`Runtime::rebase_ticks`]).
    fn update(&mut self, runtime: &mut Runtime, elapsed: Duration);
}
