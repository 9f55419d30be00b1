use std::{path::PathBuf, time::Duration};

use blockfall_engine::{GameSession, RotationDirection, SessionEvent, SessionState};
use chrono::Local;
use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};

use crate::{
    high_score::{DISPLAY_LIMIT, HighScoreEntry, HighScoreTable},
    tui::{App, Runtime},
    view::widgets::{
        GAME_OVER_BINDINGS, KeyBindingDisplay, NAME_ENTRY_BINDINGS, PAUSED_BINDINGS,
        PLAYING_BINDINGS, SessionDisplay,
    },
};

const TICK_RATE: f64 = 60.0;
const FRAME_RATE: f64 = 60.0;
const MAX_NAME_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Playing,
    EnteringName { name: String, score: u64 },
    Exiting,
}

#[derive(Debug)]
pub struct PlayApp {
    session: GameSession,
    high_scores: HighScoreTable,
    high_score_path: PathBuf,
    last_rank: Option<usize>,
    mode: Mode,
}

impl PlayApp {
    pub fn new(
        session: GameSession,
        high_scores: HighScoreTable,
        high_score_path: PathBuf,
    ) -> Self {
        Self {
            session,
            high_scores,
            high_score_path,
            last_rank: None,
            mode: Mode::Playing,
        }
    }

    fn handle_game_key(&mut self, runtime: &mut Runtime, key: KeyEvent) {
        // Rejected intents leave the session untouched; nothing to report.
        match key.code {
            KeyCode::Left => _ = self.session.try_move_left(),
            KeyCode::Right => _ = self.session.try_move_right(),
            KeyCode::Down => _ = self.session.soft_drop(),
            KeyCode::Char(' ') => _ = self.session.hard_drop(),
            KeyCode::Up | KeyCode::Char('x' | 'X') => {
                _ = self.session.try_rotate(RotationDirection::Clockwise);
            }
            KeyCode::Char('z' | 'Z') => {
                _ = self.session.try_rotate(RotationDirection::CounterClockwise);
            }
            KeyCode::Char('p' | 'P') => self.toggle_pause(runtime),
            KeyCode::Char('r' | 'R') => self.restart(runtime),
            KeyCode::Char('q' | 'Q') => self.mode = Mode::Exiting,
            _ => {}
        }
    }

    fn handle_name_key(&mut self, key: KeyEvent) {
        let Mode::EnteringName { name, score } = &mut self.mode else {
            return;
        };
        match key.code {
            KeyCode::Char(c) if !c.is_control() && name.chars().count() < MAX_NAME_LEN => {
                name.push(c);
            }
            KeyCode::Backspace => {
                name.pop();
            }
            KeyCode::Enter => {
                let (name, score) = (name.clone(), *score);
                self.save_score(&name, score);
            }
            KeyCode::Esc => {
                let score = *score;
                self.save_score("", score);
            }
            _ => {}
        }
    }

    fn toggle_pause(&mut self, runtime: &mut Runtime) {
        if self.session.toggle_pause().is_err() {
            return;
        }
        // No ticks while paused; re-enabling them starts a fresh clock.
        if self.session.state().is_paused() {
            runtime.set_tick_rate(None);
        } else {
            runtime.set_tick_rate(Some(TICK_RATE));
        }
    }

    fn restart(&mut self, runtime: &mut Runtime) {
        self.session.restart();
        self.last_rank = None;
        runtime.set_tick_rate(Some(TICK_RATE));
        runtime.rebase_ticks();
    }

    fn process_events(&mut self) {
        for event in self.session.take_events() {
            match event {
                SessionEvent::ScoreFinalized { score } => {
                    self.mode = Mode::EnteringName {
                        name: String::new(),
                        score,
                    };
                }
                SessionEvent::GameOver { score } => {
                    tracing::debug!(score, generation = self.session.generation(), "game ended");
                }
                SessionEvent::PieceLocked { .. } | SessionEvent::LevelUp { .. } => {}
            }
        }
    }

    fn save_score(&mut self, name: &str, score: u64) {
        let entry = HighScoreEntry::new(name, score, Local::now().date_naive());
        tracing::info!(name = %entry.name, score, "recording high score");
        let rank = self.high_scores.insert(entry);
        self.last_rank = Some(rank);
        if let Err(err) = self.high_scores.save(&self.high_score_path) {
            tracing::error!(error = %format!("{err:#}"), "failed to save high scores");
        }
        self.mode = Mode::Playing;
    }
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_frame_rate(FRAME_RATE);
        runtime.set_tick_rate(Some(TICK_RATE));
        if let Err(err) = self.session.start() {
            tracing::warn!(%err, "session was already started");
        }
    }

    fn should_exit(&self) -> bool {
        self.mode == Mode::Exiting
    }

    fn handle_event(&mut self, runtime: &mut Runtime, event: Event) {
        let Some(key) = event.as_key_press_event() else {
            return;
        };
        match self.mode {
            Mode::Playing => self.handle_game_key(runtime, key),
            Mode::EnteringName { .. } => self.handle_name_key(key),
            Mode::Exiting => {}
        }
        self.process_events();
    }

    fn draw(&self, frame: &mut Frame) {
        let name_prompt = match &self.mode {
            Mode::EnteringName { name, .. } => Some(name.as_str()),
            Mode::Playing | Mode::Exiting => None,
        };
        let snapshot = self.session.snapshot();
        let session_display = SessionDisplay::new(&snapshot, self.high_scores.top(DISPLAY_LIMIT))
            .highlight(self.last_rank.filter(|&rank| rank < DISPLAY_LIMIT))
            .name_prompt(name_prompt);

        let bindings = match (name_prompt, snapshot.state) {
            (Some(_), _) => NAME_ENTRY_BINDINGS,
            (None, SessionState::Paused) => PAUSED_BINDINGS,
            (None, SessionState::GameOver) => GAME_OVER_BINDINGS,
            (None, SessionState::Idle | SessionState::Running) => PLAYING_BINDINGS,
        };

        let [main_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());
        frame.render_widget(session_display, main_area);
        frame.render_widget(KeyBindingDisplay::new(bindings), help_area);
    }

    fn update(&mut self, _runtime: &mut Runtime, elapsed: Duration) {
        self.session.tick(elapsed);
        self.process_events();
    }
}
