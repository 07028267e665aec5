use parley_assistants::RunStatus;
use std::time::Duration;

/// Backoff table for waiting on a run: attempt `n` sleeps `(2 + 2n)` units,
/// so the default schedule waits 2, 4, 6, 8 and 10 seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSchedule {
    pub unit: Duration,
    pub max_attempts: u32,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            unit: Duration::from_secs(1),
            max_attempts: 5,
        }
    }
}

impl PollSchedule {
    pub fn new(unit: Duration, max_attempts: u32) -> Self {
        Self { unit, max_attempts }
    }

    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        self.unit * (2 + 2 * attempt)
    }

    pub fn delays(&self) -> Vec<Duration> {
        (0..self.max_attempts).map(|attempt| self.delay(attempt)).collect()
    }

    /// Longest time a single run can be waited on
    pub fn total_wait(&self) -> Duration {
        self.delays().into_iter().sum()
    }
}

/// Where the wait for a run stands after observing its status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    Pending,
    Succeeded,
    Failed,
    TimedOut,
}

impl CompletionState {
    /// Classify a freshly fetched status, `attempt` being the number of
    /// sleeps already spent. `requires_action` and unknown statuses count as
    /// failures.
    pub fn observe(status: RunStatus, attempt: u32, schedule: &PollSchedule) -> Self {
        if status.is_success() {
            CompletionState::Succeeded
        } else if status.is_pending() {
            if attempt < schedule.max_attempts {
                CompletionState::Pending
            } else {
                CompletionState::TimedOut
            }
        } else {
            CompletionState::Failed
        }
    }
}
