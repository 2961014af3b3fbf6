//! Transport scheduler - keeps the step highlight in phase with playback
//!
//! The scheduler never talks to the audio engine. It assumes the engine
//! started at the same instant and plays at the same tempo, and derives the
//! current step from elapsed wall-clock time on every poll:
//!
//! ```text
//! step = floor((now - start) / step_duration) mod steps_per_cycle
//! ```
//!
//! Nothing is accumulated between polls, so a late or skipped poll still
//! lands on the right step.
//!
//! Every `start` opens a new generation and hands out a [`PollToken`]. Polls
//! made with a token from an earlier generation are ignored, which stops a
//! tick scheduled before a restart from touching the new run's highlight.

use super::clock::Clock;
use super::timing::poll_interval_ms;

/// Identifies one scheduler run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollToken(u64);

/// What the renderer should highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// Highlight this step in every row
    Step(usize),
    /// Remove every highlight
    Clear,
}

impl Highlight {
    pub fn step(self) -> Option<usize> {
        match self {
            Highlight::Step(step) => Some(step),
            Highlight::Clear => None,
        }
    }
}

/// Result of a poll in the current generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Current step index
    pub step: usize,
    /// Whether the step differs from the previous poll's
    pub advanced: bool,
}

#[derive(Debug, Clone, Copy)]
struct Run {
    token: PollToken,
    start_ms: f64,
    step_duration_ms: f64,
    steps_per_cycle: usize,
    last_step: usize,
}

impl Run {
    fn step_at(&self, now_ms: f64) -> usize {
        let elapsed = (now_ms - self.start_ms).max(0.0);
        (elapsed / self.step_duration_ms).floor() as usize % self.steps_per_cycle
    }
}

/// Stopped/Running state machine producing the current step
pub struct TransportScheduler<C: Clock> {
    clock: C,
    run: Option<Run>,
    generation: u64,
}

impl<C: Clock> TransportScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            run: None,
            generation: 0,
        }
    }

    /// Start (or restart) the highlight.
    ///
    /// Records the start time and returns the new generation's token along
    /// with the first tick, which is always step 0.
    pub fn start(&mut self, step_duration_ms: f64, steps_per_cycle: usize) -> (PollToken, Tick) {
        debug_assert!(
            step_duration_ms.is_finite() && step_duration_ms > 0.0,
            "step duration must be positive"
        );
        debug_assert!(steps_per_cycle > 0, "cycle must have steps");

        self.generation = self.generation.wrapping_add(1);
        let token = PollToken(self.generation);
        let start_ms = self.clock.now_ms();

        self.run = Some(Run {
            token,
            start_ms,
            step_duration_ms,
            steps_per_cycle,
            last_step: 0,
        });

        log::debug!(
            target: "beatgrid::transport",
            "scheduler start: {:.3}ms per step, {} steps, poll every {:.3}ms",
            step_duration_ms,
            steps_per_cycle,
            poll_interval_ms(step_duration_ms)
        );

        (
            token,
            Tick {
                step: 0,
                advanced: true,
            },
        )
    }

    /// Stop the highlight.
    ///
    /// Returns [`Highlight::Clear`] if a run was active, `None` if the
    /// scheduler was already stopped. Any outstanding token is invalidated.
    pub fn stop(&mut self) -> Option<Highlight> {
        let run = self.run.take()?;
        // Bump the generation so the stopped run's token can never match again
        self.generation = self.generation.wrapping_add(1);
        log::debug!(target: "beatgrid::transport", "scheduler stop (generation {})", run.token.0);
        Some(Highlight::Clear)
    }

    /// Recompute the current step for the run identified by `token`.
    ///
    /// Returns `None` when stopped or when `token` belongs to an earlier run.
    pub fn poll(&mut self, token: PollToken) -> Option<Tick> {
        let now_ms = self.clock.now_ms();
        let run = self.run.as_mut().filter(|run| run.token == token)?;

        let step = run.step_at(now_ms);
        let advanced = step != run.last_step;
        run.last_step = step;

        if advanced {
            log::trace!(target: "beatgrid::transport", "step {}", step);
        }
        Some(Tick { step, advanced })
    }

    /// Token of the active run
    pub fn token(&self) -> Option<PollToken> {
        self.run.map(|run| run.token)
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Current step without recording it (None when stopped)
    pub fn current_step(&self) -> Option<usize> {
        let now_ms = self.clock.now_ms();
        self.run.map(|run| run.step_at(now_ms))
    }

    /// When the active run started, in clock milliseconds
    pub fn start_time_ms(&self) -> Option<f64> {
        self.run.map(|run| run.start_ms)
    }

    pub fn step_duration_ms(&self) -> Option<f64> {
        self.run.map(|run| run.step_duration_ms)
    }

    /// How often the host should call [`poll`](Self::poll)
    pub fn poll_interval_ms(&self) -> Option<f64> {
        self.run.map(|run| poll_interval_ms(run.step_duration_ms))
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::clock::ManualClock;

    fn scheduler() -> (ManualClock, TransportScheduler<ManualClock>) {
        let clock = ManualClock::new();
        (clock.clone(), TransportScheduler::new(clock))
    }

    #[test]
    fn test_start_yields_step_zero() {
        let (clock, mut sched) = scheduler();
        clock.set(1000.0);

        let (_, tick) = sched.start(62.5, 16);
        assert_eq!(tick.step, 0);
        assert_eq!(sched.start_time_ms(), Some(1000.0));
        assert!(sched.is_running());
    }

    #[test]
    fn test_step_from_elapsed_time() {
        let (clock, mut sched) = scheduler();
        let (token, _) = sched.start(62.5, 16);

        clock.advance(130.0);
        let tick = sched.poll(token).unwrap();
        assert_eq!(tick.step, 2);
        assert!(tick.advanced);

        // Same step on the next poll
        clock.advance(1.0);
        let tick = sched.poll(token).unwrap();
        assert_eq!(tick.step, 2);
        assert!(!tick.advanced);
    }

    #[test]
    fn test_wraps_at_cycle_end() {
        let (clock, mut sched) = scheduler();
        let (token, _) = sched.start(62.5, 16);

        clock.advance(62.5 * 16.0);
        assert_eq!(sched.poll(token).unwrap().step, 0);
        clock.advance(62.5 * 3.0);
        assert_eq!(sched.poll(token).unwrap().step, 3);
    }

    #[test]
    fn test_missed_polls_self_correct() {
        let (clock, mut sched) = scheduler();
        let (token, _) = sched.start(100.0, 12);

        // A long stall: no polls for 5.55 seconds
        clock.advance(5_550.0);
        // floor(5550 / 100) = 55, 55 mod 12 = 7
        assert_eq!(sched.poll(token).unwrap().step, 7);
    }

    #[test]
    fn test_stop_clears_and_is_idempotent() {
        let (_, mut sched) = scheduler();
        let (token, _) = sched.start(62.5, 16);

        assert_eq!(sched.stop(), Some(Highlight::Clear));
        assert_eq!(sched.start_time_ms(), None);
        assert!(sched.poll(token).is_none());
        assert_eq!(sched.current_step(), None);

        // Second stop is a no-op
        assert_eq!(sched.stop(), None);
    }

    #[test]
    fn test_stale_token_after_restart() {
        let (clock, mut sched) = scheduler();
        let (old, _) = sched.start(62.5, 16);
        clock.advance(200.0);

        sched.stop();
        let (new, _) = sched.start(62.5, 16);
        assert_ne!(old, new);

        clock.advance(70.0);
        assert!(sched.poll(old).is_none());
        assert_eq!(sched.poll(new).unwrap().step, 1);
    }

    #[test]
    fn test_restart_without_stop_invalidates_token() {
        let (_, mut sched) = scheduler();
        let (old, _) = sched.start(62.5, 16);
        let (new, _) = sched.start(50.0, 12);

        assert!(sched.poll(old).is_none());
        assert!(sched.poll(new).is_some());
        assert_eq!(sched.token(), Some(new));
    }

    #[test]
    fn test_poll_interval() {
        let (_, mut sched) = scheduler();
        assert_eq!(sched.poll_interval_ms(), None);
        sched.start(62.5, 16);
        assert_eq!(sched.poll_interval_ms(), Some(31.25));
        sched.start(500.0, 16);
        assert_eq!(sched.poll_interval_ms(), Some(50.0));
    }
}
