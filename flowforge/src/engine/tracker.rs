//! In-progress execution registry and statistics accumulation.
//!
//! The tracker is an explicit object injected into the engine, backed
//! by the execution store so terminal records outlive the process. The
//! in-memory map is written only by the run that owns a given execution
//! id; status polls may come from any task.

use crate::core::{Execution, ExecutionStatus, NodeStats};
use crate::events::{CompletionEvent, EventSink};
use crate::store::ExecutionStore;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Maintains the canonical in-progress `Execution` for each run.
pub struct ExecutionTracker {
    active: DashMap<Uuid, Execution>,
    store: Arc<dyn ExecutionStore>,
    sink: Arc<dyn EventSink>,
}

impl ExecutionTracker {
    /// Creates a tracker persisting through `store` and notifying
    /// `sink` on completion.
    #[must_use]
    pub fn new(store: Arc<dyn ExecutionStore>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            active: DashMap::new(),
            store,
            sink,
        }
    }

    /// Registers a fresh pending execution for a pipeline and returns
    /// a snapshot of it.
    #[must_use]
    pub fn register(&self, pipeline_id: Uuid) -> Execution {
        let execution = Execution::new(pipeline_id);
        self.active.insert(execution.id, execution.clone());
        execution
    }

    /// Moves an execution from pending to running.
    pub fn mark_running(&self, id: Uuid) {
        self.with_execution(id, |execution| {
            if let Err(err) = execution.transition(ExecutionStatus::Running) {
                error!(execution_id = %id, %err, "tracker transition rejected");
            }
        });
    }

    /// Records statistics for one node.
    pub fn record_node(&self, id: Uuid, node_id: Uuid, stats: NodeStats) {
        self.with_execution(id, |execution| {
            execution.node_stats.insert(node_id, stats);
        });
    }

    /// Accumulates pipeline-wide output rows.
    pub fn add_rows(&self, id: Uuid, rows: u64) {
        self.with_execution(id, |execution| {
            execution.rows_processed += rows;
        });
    }

    /// Appends a run-level error string.
    pub fn append_error(&self, id: Uuid, message: String) {
        self.with_execution(id, |execution| {
            execution.errors.push(message);
        });
    }

    /// Returns a snapshot of an execution, for status polling. Terminal
    /// executions stay pollable until [`Self::evict`].
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<Execution> {
        self.active.get(&id).map(|entry| entry.value().clone())
    }

    /// Moves an execution to a terminal status, persists the record,
    /// and emits the completion event. Returns the terminal snapshot.
    pub async fn finalize(&self, id: Uuid, status: ExecutionStatus) -> Option<Execution> {
        let record = {
            let mut entry = self.active.get_mut(&id)?;
            if let Err(err) = entry.transition(status) {
                error!(execution_id = %id, %err, "tracker transition rejected");
            }
            entry.clone()
        };

        if let Err(err) = self.store.create(record.clone()).await {
            error!(execution_id = %id, %err, "failed to persist execution record");
        }
        self.sink.emit(&CompletionEvent::from(&record)).await;

        Some(record)
    }

    /// Removes a terminal execution from the in-memory registry. The
    /// persisted record remains available through the execution store.
    pub fn evict(&self, id: Uuid) -> Option<Execution> {
        self.active.remove(&id).map(|(_, execution)| execution)
    }

    fn with_execution(&self, id: Uuid, mutate: impl FnOnce(&mut Execution)) {
        match self.active.get_mut(&id) {
            Some(mut entry) => mutate(&mut entry),
            None => error!(execution_id = %id, "tracker update for unknown execution"),
        }
    }
}
