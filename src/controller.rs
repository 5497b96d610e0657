//! Interval session controller: the work/rest state machine.
//!
//! A session is driven by ticks from its [`TickSource`] and reports phase
//! changes and completion through its [`Notifier`]. Exactly one
//! [`SessionOutcome`] is returned over the lifetime of a session, either from
//! [`IntervalSession::tick`] when the goal is met or from
//! [`IntervalSession::stop`].

use chrono::{DateTime, Local};

use crate::notify::{Alert, Notifier};
use crate::runtime::{TickId, TickSource};
use crate::session::{Phase, SessionConfig, SessionGoal, SessionOutcome, SessionState};
use crate::util::format_clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Elapsed { elapsed: u64, total: u64 },
    Cycles { completed: u64, max: u64 },
}

impl Progress {
    pub fn label(&self) -> String {
        match self {
            Progress::Elapsed { elapsed, total } => format!(
                "Elapsed: {} / {}",
                format_clock(*elapsed),
                format_clock(*total)
            ),
            Progress::Cycles { completed, max } => format!("Cycle: {} / {}", completed, max),
        }
    }
}

/// Everything the session screen needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub phase: Phase,
    pub countdown: String,
    pub progress: Progress,
    pub running: bool,
}

pub struct IntervalSession<T: TickSource, N: Notifier> {
    config: SessionConfig,
    state: SessionState,
    outcome: Option<SessionOutcome>,
    started_at: DateTime<Local>,
    ticker: T,
    notifier: N,
}

impl<T: TickSource, N: Notifier> IntervalSession<T, N> {
    /// Creates the session and starts ticking right away.
    pub fn new(config: SessionConfig, ticker: T, notifier: N) -> Self {
        let mut session = Self {
            state: SessionState::new(&config),
            config,
            outcome: None,
            started_at: Local::now(),
            ticker,
            notifier,
        };
        tracing::info!(
            mode = %config.mode(),
            work_secs = config.work_secs,
            rest_secs = config.rest_secs,
            "Session started"
        );
        session.start();
        session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn is_terminated(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn start(&mut self) {
        if self.state.running || self.is_terminated() {
            return;
        }
        self.ticker.start();
        self.state.running = true;
    }

    pub fn resume(&mut self) {
        if !self.state.running && !self.is_terminated() {
            tracing::info!(elapsed = self.state.elapsed_total, "Session resumed");
        }
        self.start();
    }

    pub fn pause(&mut self) {
        if !self.state.running {
            return;
        }
        self.ticker.stop();
        self.state.running = false;
        tracing::info!(elapsed = self.state.elapsed_total, "Session paused");
    }

    pub fn toggle(&mut self) {
        if self.state.running {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// Ends the session without a completion alert.
    pub fn stop(&mut self) -> Option<SessionOutcome> {
        if self.is_terminated() {
            return None;
        }
        tracing::info!(elapsed = self.state.elapsed_total, "Session stopped");
        Some(self.finish(SessionOutcome::Stopped))
    }

    /// Handles a tick from the event loop, dropping ticks that belong to an
    /// earlier activation of the tick source.
    pub fn on_tick(&mut self, tick: TickId) -> Option<SessionOutcome> {
        if !self.ticker.accepts(tick) {
            tracing::trace!(tick = tick.0, "Discarding stale tick");
            return None;
        }
        self.tick()
    }

    /// Advances the session by one second.
    pub fn tick(&mut self) -> Option<SessionOutcome> {
        if !self.state.running || self.is_terminated() {
            return None;
        }

        self.state.elapsed_total += 1;

        if self.goal_met() {
            return Some(self.complete());
        }

        if self.state.time_left_in_phase <= 1 {
            let next = self.state.phase.next();
            if next == Phase::Work {
                self.state.completed_cycles += 1;
                // A cycle ends with its rest phase; the goal may be met here.
                if self.goal_met() {
                    return Some(self.complete());
                }
            }
            self.state.phase = next;
            self.state.time_left_in_phase = self.config.phase_secs(next);
            tracing::debug!(
                phase = %next,
                elapsed = self.state.elapsed_total,
                cycles = self.state.completed_cycles,
                "Phase changed"
            );
            self.notifier.notify(&Alert::PhaseChanged(next));
        } else {
            self.state.time_left_in_phase -= 1;
        }

        None
    }

    pub fn view(&self) -> SessionView {
        let progress = match self.config.goal {
            SessionGoal::Duration { total_secs } => Progress::Elapsed {
                elapsed: self.state.elapsed_total,
                total: total_secs,
            },
            SessionGoal::Cycles { max_cycles } => Progress::Cycles {
                completed: self.state.completed_cycles,
                max: max_cycles,
            },
        };

        SessionView {
            phase: self.state.phase,
            countdown: format_clock(self.state.time_left_in_phase),
            progress,
            running: self.state.running,
        }
    }

    fn goal_met(&self) -> bool {
        match self.config.goal {
            SessionGoal::Duration { total_secs } => self.state.elapsed_total >= total_secs,
            SessionGoal::Cycles { max_cycles } => self.state.completed_cycles >= max_cycles,
        }
    }

    fn complete(&mut self) -> SessionOutcome {
        let outcome = self.finish(SessionOutcome::Completed);
        tracing::info!(
            elapsed = self.state.elapsed_total,
            cycles = self.state.completed_cycles,
            "Session completed"
        );
        self.notifier.notify(&Alert::Completed {
            goal: self.config.goal,
        });
        outcome
    }

    fn finish(&mut self, outcome: SessionOutcome) -> SessionOutcome {
        self.ticker.stop();
        self.state.running = false;
        self.outcome = Some(outcome);
        outcome
    }
}

impl<T: TickSource, N: Notifier> Drop for IntervalSession<T, N> {
    fn drop(&mut self) {
        self.ticker.stop();
    }
}
