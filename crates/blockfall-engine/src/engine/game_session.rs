use std::{mem, time::Duration};

use serde::Serialize;

use crate::{
    ConfigError, IntentError, LifecycleError, PieceCollisionError,
    core::{
        board::Board,
        piece::{Piece, PieceKind, RotationDirection},
    },
};

use super::{GameConfig, GameStats, PieceBag, PieceSeed, SessionEvent, SessionSnapshot};

/// Lifecycle state of a [`GameSession`].
///
/// `Idle -> Running <-> Paused`, and `Running -> GameOver` once a spawned
/// piece collides. `GameOver` is terminal until [`GameSession::restart`].
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    #[display("idle")]
    Idle,
    #[display("running")]
    Running,
    #[display("paused")]
    Paused,
    #[display("game over")]
    GameOver,
}

/// What a downward step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum DropOutcome {
    /// The piece moved one row down.
    Moved,
    /// The piece could not move and was locked.
    Locked(LockOutcome),
}

/// Result of locking the active piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOutcome {
    pub cleared_lines: usize,
    pub score_delta: u64,
    pub leveled_up: bool,
    /// The piece spawned after the lock collided and the session ended.
    pub game_over: bool,
}

/// A single game: board, active and next pieces, statistics and timing.
///
/// The session only advances when the host calls into it: [`Self::tick`] for
/// elapsed time and the intent methods for player input. Every call runs to
/// completion before returning, and a rejected call leaves the session
/// unchanged.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::{DropOutcome, GameConfig, GameSession, SessionState};
///
/// let mut session = GameSession::new(GameConfig::default()).unwrap();
/// assert_eq!(session.state(), SessionState::Idle);
///
/// session.start().unwrap();
/// let y = session.active_piece().unwrap().position().y();
/// assert_eq!(session.tick(Duration::from_millis(999)), None);
/// assert_eq!(session.tick(Duration::from_millis(2)), Some(DropOutcome::Moved));
/// assert_eq!(session.active_piece().unwrap().position().y(), y + 1);
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    board: Board,
    bag: PieceBag,
    active: Option<Piece>,
    next: Option<PieceKind>,
    stats: GameStats,
    state: SessionState,
    drop_elapsed: Duration,
    generation: u64,
    events: Vec<SessionEvent>,
}

impl GameSession {
    /// Creates an idle session with a random piece sequence.
    ///
    /// Fails when `config` does not pass [`GameConfig::validate`].
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_bag(config, PieceBag::new())
    }

    /// Creates an idle session whose piece sequence is fixed by `seed`.
    pub fn with_seed(config: GameConfig, seed: PieceSeed) -> Result<Self, ConfigError> {
        Self::with_bag(config, PieceBag::with_seed(seed))
    }

    fn with_bag(config: GameConfig, bag: PieceBag) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = config.new_board()?;
        let stats = GameStats::new(&config.scoring);
        Ok(Self {
            config,
            board,
            bag,
            active: None,
            next: None,
            stats,
            state: SessionState::Idle,
            drop_elapsed: Duration::ZERO,
            generation: 0,
            events: vec![],
        })
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn next_piece(&self) -> Option<PieceKind> {
        self.next
    }

    /// Where the active piece would rest if hard-dropped.
    #[must_use]
    pub fn ghost_piece(&self) -> Option<Piece> {
        self.active.map(|piece| piece.ghost_position(&self.board))
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.state.is_game_over()
    }

    /// Time accumulated towards the next automatic drop.
    #[must_use]
    pub fn drop_elapsed(&self) -> Duration {
        self.drop_elapsed
    }

    /// Number of restarts so far.
    ///
    /// Hosts holding timers for a session can compare generations to discard
    /// ticks scheduled before a restart.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Copies out everything a renderer needs.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            board: self.board.clone(),
            active_piece: self.active,
            ghost_piece: self.ghost_piece(),
            next_piece: self.next,
            score: self.stats.score(),
            level: self.stats.level(),
            total_cleared_lines: self.stats.total_cleared_lines(),
            drop_interval: self.stats.drop_interval(),
            line_clears: *self.stats.line_cleared_counter(),
            state: self.state,
            is_over: self.is_over(),
        }
    }

    /// Drains the events queued since the last call.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        mem::take(&mut self.events)
    }

    /// Starts an idle session by spawning the first piece.
    pub fn start(&mut self) -> Result<(), LifecycleError> {
        if !self.state.is_idle() {
            return Err(LifecycleError {
                action: "start",
                state: self.state,
            });
        }
        self.state = SessionState::Running;
        tracing::info!(generation = self.generation, "session started");
        self.spawn();
        Ok(())
    }

    /// Discards the current game and starts a fresh one.
    ///
    /// Allowed from every state. The new piece sequence is derived from the
    /// old one, so seeded sessions restart deterministically. Queued events
    /// are kept until drained.
    pub fn restart(&mut self) {
        let seed = self.bag.fork_seed();
        self.bag = PieceBag::with_seed(seed);
        self.board.clear();
        self.active = None;
        self.next = None;
        self.stats = GameStats::new(&self.config.scoring);
        self.drop_elapsed = Duration::ZERO;
        self.generation += 1;
        self.state = SessionState::Running;
        tracing::info!(generation = self.generation, "session restarted");
        self.spawn();
    }

    pub fn pause(&mut self) -> Result<(), LifecycleError> {
        if !self.state.is_running() {
            return Err(LifecycleError {
                action: "pause",
                state: self.state,
            });
        }
        self.state = SessionState::Paused;
        Ok(())
    }

    /// Resumes a paused session.
    ///
    /// The drop accumulator keeps the time collected before the pause; time
    /// spent paused is never credited, so hosts must not replay it.
    pub fn resume(&mut self) -> Result<(), LifecycleError> {
        if !self.state.is_paused() {
            return Err(LifecycleError {
                action: "resume",
                state: self.state,
            });
        }
        self.state = SessionState::Running;
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> Result<(), LifecycleError> {
        match self.state {
            SessionState::Paused => self.resume(),
            _ => self.pause(),
        }
    }

    /// Advances the auto-drop timer by `elapsed`.
    ///
    /// Once the accumulated time exceeds the drop interval, the active piece
    /// steps down once (exactly like [`Self::soft_drop`]) and the
    /// accumulator restarts from zero. At most one step happens per call.
    /// Outside [`SessionState::Running`] this does nothing.
    pub fn tick(&mut self, elapsed: Duration) -> Option<DropOutcome> {
        let piece = self.running_piece().ok()?;
        self.drop_elapsed = self.drop_elapsed.saturating_add(elapsed);
        if self.drop_elapsed <= self.stats.drop_interval() {
            return None;
        }
        Some(self.step_down(piece))
    }

    /// Shifts the active piece `dx` columns sideways.
    pub fn try_move(&mut self, dx: i32) -> Result<(), IntentError> {
        let piece = self.running_piece()?.moved(dx, 0);
        if self.board.collides(&piece) {
            return Err(PieceCollisionError.into());
        }
        self.active = Some(piece);
        Ok(())
    }

    pub fn try_move_left(&mut self) -> Result<(), IntentError> {
        self.try_move(-1)
    }

    pub fn try_move_right(&mut self) -> Result<(), IntentError> {
        self.try_move(1)
    }

    /// Rotates the active piece, kicking it sideways if needed.
    pub fn try_rotate(&mut self, direction: RotationDirection) -> Result<(), IntentError> {
        let piece = self
            .running_piece()?
            .rotated_with_kick(direction, &self.board)
            .ok_or(PieceCollisionError)?;
        self.active = Some(piece);
        Ok(())
    }

    /// Moves the active piece one row down, locking it if it cannot move.
    pub fn soft_drop(&mut self) -> Result<DropOutcome, IntentError> {
        let piece = self.running_piece()?;
        Ok(self.step_down(piece))
    }

    /// Drops the active piece to its ghost position and locks it.
    pub fn hard_drop(&mut self) -> Result<LockOutcome, IntentError> {
        let piece = self.running_piece()?.ghost_position(&self.board);
        Ok(self.lock(piece))
    }

    fn running_piece(&self) -> Result<Piece, IntentError> {
        match (self.state, self.active) {
            (SessionState::Running, Some(piece)) => Ok(piece),
            _ => Err(IntentError::NotRunning),
        }
    }

    fn step_down(&mut self, piece: Piece) -> DropOutcome {
        let moved = piece.down();
        if self.board.collides(&moved) {
            return DropOutcome::Locked(self.lock(piece));
        }
        self.active = Some(moved);
        self.drop_elapsed = Duration::ZERO;
        DropOutcome::Moved
    }

    /// Lock, sweep, score, then spawn the next piece.
    fn lock(&mut self, piece: Piece) -> LockOutcome {
        self.board.lock(&piece);
        self.active = None;
        self.drop_elapsed = Duration::ZERO;

        let cleared_lines = self.board.sweep_full_rows();
        let update = self
            .stats
            .complete_piece_drop(cleared_lines, &self.config.scoring);
        tracing::debug!(
            kind = %piece.kind(),
            cleared_lines,
            score = self.stats.score(),
            "piece locked"
        );
        self.events.push(SessionEvent::PieceLocked {
            kind: piece.kind(),
            cleared_lines,
        });
        if update.leveled_up {
            tracing::info!(
                level = update.level,
                drop_interval = ?update.drop_interval,
                "level up"
            );
            self.events.push(SessionEvent::LevelUp {
                level: update.level,
            });
        }

        self.spawn();
        LockOutcome {
            cleared_lines,
            score_delta: update.score_delta,
            leveled_up: update.leveled_up,
            game_over: self.is_over(),
        }
    }

    /// Promotes the queued piece to active and queues a new one.
    ///
    /// A piece that collides at its spawn point is not placed and the
    /// session ends.
    fn spawn(&mut self) {
        let kind = match self.next.take() {
            Some(kind) => kind,
            None => self.bag.pop_next(),
        };
        self.next = Some(self.bag.pop_next());

        let piece = Piece::spawn(kind, self.board.width());
        if self.board.collides(&piece) {
            let score = self.stats.score();
            tracing::info!(
                score,
                level = self.stats.level(),
                lines = self.stats.total_cleared_lines(),
                "game over"
            );
            self.active = None;
            self.state = SessionState::GameOver;
            self.events.push(SessionEvent::GameOver { score });
            if score > 0 {
                self.events.push(SessionEvent::ScoreFinalized { score });
            }
            return;
        }
        tracing::trace!(%kind, next = ?self.next, "piece spawned");
        self.active = Some(piece);
    }
}
