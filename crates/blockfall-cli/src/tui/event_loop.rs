use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event;

use super::event::TuiEvent;

/// Measures the time between ticks.
///
/// [`TickClock::rebase`] forgets everything before `now`, so a pause (or a
/// restart) never shows up as one huge elapsed delta afterwards.
#[derive(Debug, Clone, Copy)]
pub(super) struct TickClock {
    last: Instant,
}

impl TickClock {
    pub(super) fn new(now: Instant) -> Self {
        Self { last: now }
    }

    pub(super) fn next_due(&self, interval: Duration) -> Instant {
        self.last + interval
    }

    /// Returns the time since the previous tick and starts a new period at `now`.
    pub(super) fn advance(&mut self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed
    }

    pub(super) fn rebase(&mut self, now: Instant) {
        self.last = now;
    }
}

/// Event loop state management.
///
/// Produces ticks every `tick_interval` (if set) and a render event at most
/// every `frame_interval` after something changed.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Option<Duration>,
    frame_interval: Duration,
    ticks: TickClock,
    last_render: Instant,
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

    /// Creates a new `EventLoop` with ticks disabled.
    pub(super) fn new() -> Self {
        let now = Instant::now();
        Self {
            tick_interval: None,
            frame_interval: Self::DEFAULT_FRAME_INTERVAL,
            ticks: TickClock::new(now),
            last_render: now.checked_sub(Self::DEFAULT_FRAME_INTERVAL).unwrap_or(now),
            dirty: true, // initial render
        }
    }

    /// Sets the tick interval; `None` stops tick events.
    ///
    /// Re-enabling ticks rebases the clock, so time spent without ticks is
    /// not reported.
    pub(super) fn set_tick_interval(&mut self, interval: Option<Duration>) {
        if self.tick_interval.is_none() && interval.is_some() {
            self.ticks.rebase(Instant::now());
        }
        self.tick_interval = interval;
    }

    pub(super) fn set_frame_interval(&mut self, interval: Duration) {
        self.frame_interval = interval;
    }

    pub(super) fn rebase_ticks(&mut self) {
        self.ticks.rebase(Instant::now());
    }

    /// Returns the next event, blocking until one is due.
    pub(super) fn next(&mut self) -> io::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(interval) = self.tick_interval
                && now >= self.ticks.next_due(interval)
            {
                self.dirty = true;
                return Ok(TuiEvent::Tick(self.ticks.advance(now)));
            }

            let next_render_at = self.last_render + self.frame_interval;
            if self.dirty && now >= next_render_at {
                self.last_render = now;
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            let next_tick_at = self.tick_interval.map(|i| self.ticks.next_due(i));
            let next_render_at = self.dirty.then_some(next_render_at);
            let timeout = [next_tick_at, next_render_at]
                .into_iter()
                .flatten()
                .min()
                .map(|at| at.saturating_duration_since(now));

            let ready = match timeout {
                Some(timeout) => event::poll(timeout)?,
                None => true,
            };
            if !ready {
                continue;
            }

            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_reports_elapsed() {
        let start = Instant::now();
        let mut clock = TickClock::new(start);
        assert_eq!(
            clock.advance(start + Duration::from_millis(16)),
            Duration::from_millis(16)
        );
        assert_eq!(
            clock.advance(start + Duration::from_millis(40)),
            Duration::from_millis(24)
        );
        assert_eq!(
            clock.next_due(Duration::from_millis(16)),
            start + Duration::from_millis(56)
        );
    }

    #[test]
    fn test_rebase_drops_paused_time() {
        let start = Instant::now();
        let mut clock = TickClock::new(start);
        clock.advance(start + Duration::from_millis(100));
        // paused for ten seconds, then resumed
        clock.rebase(start + Duration::from_secs(10));
        assert_eq!(
            clock.advance(start + Duration::from_secs(10) + Duration::from_millis(16)),
            Duration::from_millis(16)
        );
    }

    #[test]
    fn test_clock_never_goes_negative() {
        let start = Instant::now();
        let mut clock = TickClock::new(start + Duration::from_secs(1));
        assert_eq!(clock.advance(start), Duration::ZERO);
    }

    #[test]
    fn test_enabling_ticks_rebases() {
        let mut events = EventLoop::new();
        let before = events.ticks.next_due(Duration::ZERO);
        events.set_tick_interval(Some(Duration::from_millis(16)));
        assert!(events.ticks.next_due(Duration::ZERO) >= before);
        assert_eq!(events.tick_interval, Some(Duration::from_millis(16)));
        events.set_tick_interval(None);
        assert_eq!(events.tick_interval, None);
    }
}
