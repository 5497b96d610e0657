use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Work,
    Rest,
}

impl Phase {
    pub fn next(self) -> Self {
        match self {
            Phase::Work => Phase::Rest,
            Phase::Rest => Phase::Work,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Duration,
    Cycles,
}

/// What ends a session. Only one of the two counters is ever consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionGoal {
    Duration { total_secs: u64 },
    Cycles { max_cycles: u64 },
}

/// Validated work/rest pattern, fixed for the lifetime of a session.
///
/// All values are positive; `SetupForm::validate` is the only producer in the
/// application and rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub work_secs: u64,
    pub rest_secs: u64,
    pub goal: SessionGoal,
}

impl SessionConfig {
    pub fn duration(work_secs: u64, rest_secs: u64, total_secs: u64) -> Self {
        Self {
            work_secs,
            rest_secs,
            goal: SessionGoal::Duration { total_secs },
        }
    }

    pub fn cycles(work_secs: u64, rest_secs: u64, max_cycles: u64) -> Self {
        Self {
            work_secs,
            rest_secs,
            goal: SessionGoal::Cycles { max_cycles },
        }
    }

    pub fn mode(&self) -> SessionMode {
        match self.goal {
            SessionGoal::Duration { .. } => SessionMode::Duration,
            SessionGoal::Cycles { .. } => SessionMode::Cycles,
        }
    }

    pub fn phase_secs(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.work_secs,
            Phase::Rest => self.rest_secs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub phase: Phase,
    pub time_left_in_phase: u64,
    pub elapsed_total: u64,
    pub completed_cycles: u64,
    pub running: bool,
}

impl SessionState {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            phase: Phase::Work,
            time_left_in_phase: config.work_secs,
            elapsed_total: 0,
            completed_cycles: 0,
            running: false,
        }
    }
}

/// Termination signal handed back to the caller exactly once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionOutcome {
    Completed,
    Stopped,
}
