use super::progress::JobProgress;

/// Lifecycle of a compression job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Staging,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Cancelled
        )
    }
}

/// Terminal outcome of a job run, delivered exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    Success,
    Failure(String),
    Cancelled,
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        matches!(self, JobResult::Success)
    }

    /// The state a job ends in when it produces this result
    pub fn terminal_state(&self) -> JobState {
        match self {
            JobResult::Success => JobState::Succeeded,
            JobResult::Failure(_) => JobState::Failed,
            JobResult::Cancelled => JobState::Cancelled,
        }
    }
}

/// Everything a job reports to its subscriber, in order.
/// `Finished` is always the last event of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    State(JobState),
    Progress(JobProgress),
    Finished(JobResult),
}
