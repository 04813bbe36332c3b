//! Dispatcher value objects

use serde::{Deserialize, Serialize};

/// Scheduling priority requested at submission time.
///
/// Low-priority jobs enter the queue with an initial delay so that
/// interactive work is claimed first under contention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Normal => write!(f, "normal"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Job status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Job is recorded but not yet enqueued
    Pending,
    /// Job has been enqueued for background processing
    Queued,
    /// Job is currently running on a worker
    Running,
    /// Job completed successfully
    Completed,
    /// Job failed after exhausting its delivery budget
    Failed,
}

impl JobStatus {
    /// Returns the set of valid target states from the current state.
    ///
    /// ```text
    /// Pending ──► Queued ──► Running ──► Completed
    ///                          │  ▲          │
    ///                          └──┘          └──► Failed
    /// ```
    ///
    /// `Running → Running` is allowed: under at-least-once delivery a
    /// message can be reclaimed after its visibility window expires while
    /// the record still says a (possibly dead) worker owns it.
    pub fn valid_transitions(&self) -> &[JobStatus] {
        match self {
            Self::Pending => &[Self::Queued],
            Self::Queued => &[Self::Running],
            Self::Running => &[Self::Running, Self::Completed, Self::Failed],
            Self::Completed | Self::Failed => &[],
        }
    }

    /// Check whether transitioning to `target` is allowed from the current state.
    pub fn can_transition_to(&self, target: &JobStatus) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Whether this status represents a terminal (final) state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Queued => write!(f, "Queued"),
            Self::Running => write!(f, "Running"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Recorded state transition for an audit job (audit trail).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTransition {
    pub from: JobStatus,
    pub to: JobStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Human-readable reason or context for the transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Error returned when an invalid status transition is attempted.
#[derive(Debug, thiserror::Error)]
#[error("Invalid job transition from {from} to {to}")]
pub struct JobTransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_follows_the_happy_path() {
        assert!(JobStatus::Pending.can_transition_to(&JobStatus::Queued));
        assert!(JobStatus::Queued.can_transition_to(&JobStatus::Running));
        assert!(JobStatus::Running.can_transition_to(&JobStatus::Completed));
        assert!(JobStatus::Running.can_transition_to(&JobStatus::Failed));
    }

    #[test]
    fn redelivery_may_reclaim_a_running_job() {
        assert!(JobStatus::Running.can_transition_to(&JobStatus::Running));
    }

    #[test]
    fn terminal_states_accept_nothing() {
        assert!(JobStatus::Completed.valid_transitions().is_empty());
        assert!(JobStatus::Failed.valid_transitions().is_empty());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn skipping_states_is_rejected() {
        assert!(!JobStatus::Pending.can_transition_to(&JobStatus::Running));
        assert!(!JobStatus::Queued.can_transition_to(&JobStatus::Completed));
        assert!(!JobStatus::Pending.can_transition_to(&JobStatus::Failed));
    }
}
