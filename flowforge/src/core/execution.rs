//! Execution records: one timed run of a pipeline.

use crate::errors::EngineError;
use crate::utils::generate_uuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// The lifecycle status of an execution.
///
/// The only legal transitions are pending → running → (completed | failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Created but not yet started.
    #[default]
    Pending,
    /// Currently running.
    Running,
    /// Finished with every node completing.
    Completed,
    /// Aborted by a node-level failure.
    Failed,
}

impl ExecutionStatus {
    /// Returns true if the status represents a terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if `next` is a legal successor of this status.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Per-node statistics for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeStats {
    /// Rows the node received as input.
    pub processed: u64,
    /// Row-level errors the node reported.
    pub errors: u64,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: f64,
}

/// One timed run of a pipeline, with its own status and statistics.
///
/// Created when a run is triggered, mutated only by the engine and
/// tracker for that run, immutable once terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    /// Unique id of this run.
    pub id: Uuid,
    /// The pipeline this run belongs to.
    pub pipeline_id: Uuid,
    /// Current lifecycle status.
    pub status: ExecutionStatus,
    /// When the run was triggered.
    pub started_at: DateTime<Utc>,
    /// When the run reached a terminal status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Cumulative output rows across all nodes.
    pub rows_processed: u64,
    /// Human-readable error strings, in occurrence order.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Statistics per node id.
    #[serde(default)]
    pub node_stats: HashMap<Uuid, NodeStats>,
}

impl Execution {
    /// Creates a new pending execution for the given pipeline.
    #[must_use]
    pub fn new(pipeline_id: Uuid) -> Self {
        Self {
            id: generate_uuid(),
            pipeline_id,
            status: ExecutionStatus::Pending,
            started_at: Utc::now(),
            completed_at: None,
            rows_processed: 0,
            errors: Vec::new(),
            node_stats: HashMap::new(),
        }
    }

    /// Moves the execution to `next`, enforcing the legal transitions.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Internal` on an illegal transition.
    pub fn transition(&mut self, next: ExecutionStatus) -> Result<(), EngineError> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::Internal(format!(
                "illegal execution status transition {} -> {}",
                self.status, next
            )));
        }
        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use ExecutionStatus::{Completed, Failed, Pending, Running};

        assert!(Pending.can_transition_to(Running));
        assert!(Running.can_transition_to(Completed));
        assert!(Running.can_transition_to(Failed));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Running));
        assert!(!Failed.can_transition_to(Pending));
        assert!(!Running.can_transition_to(Running));
    }

    #[test]
    fn test_status_is_terminal() {
        assert!(ExecutionStatus::Completed.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
        assert!(!ExecutionStatus::Pending.is_terminal());
        assert!(!ExecutionStatus::Running.is_terminal());
    }

    #[test]
    fn test_transition_sets_completed_at() {
        let mut execution = Execution::new(Uuid::nil());
        assert!(execution.completed_at.is_none());

        execution.transition(ExecutionStatus::Running).unwrap();
        assert!(execution.completed_at.is_none());

        execution.transition(ExecutionStatus::Completed).unwrap();
        assert!(execution.completed_at.is_some());
    }

    #[test]
    fn test_illegal_transition_is_internal_error() {
        let mut execution = Execution::new(Uuid::nil());
        let err = execution.transition(ExecutionStatus::Completed).unwrap_err();
        assert!(err.to_string().contains("illegal execution status transition"));
        assert_eq!(execution.status, ExecutionStatus::Pending);
    }

    #[test]
    fn test_status_serialize() {
        let json = serde_json::to_string(&ExecutionStatus::Running).unwrap();
        assert_eq!(json, r#""running""#);

        let back: ExecutionStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ExecutionStatus::Running);
    }
}
