//! Completion events for external observability consumers.

use crate::core::{Execution, ExecutionStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Emitted once per terminal execution for dashboards and alerting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionEvent {
    /// The finished execution.
    pub execution_id: Uuid,
    /// The pipeline it ran.
    pub pipeline_id: Uuid,
    /// Terminal status.
    pub status: ExecutionStatus,
    /// Cumulative output rows.
    pub rows_processed: u64,
    /// Error strings collected during the run.
    pub errors: Vec<String>,
}

impl From<&Execution> for CompletionEvent {
    fn from(execution: &Execution) -> Self {
        Self {
            execution_id: execution.id,
            pipeline_id: execution.pipeline_id,
            status: execution.status,
            rows_processed: execution.rows_processed,
            errors: execution.errors.clone(),
        }
    }
}

/// Receives completion events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emits an event asynchronously.
    async fn emit(&self, event: &CompletionEvent);

    /// Emits an event without awaiting. Must never raise; failures are
    /// logged and suppressed.
    fn try_emit(&self, event: &CompletionEvent);
}

/// Discards all events. The default when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: &CompletionEvent) {}

    fn try_emit(&self, _event: &CompletionEvent) {}
}

/// Logs events through the tracing framework.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

impl LoggingEventSink {
    fn log(event: &CompletionEvent) {
        if event.status == ExecutionStatus::Failed {
            warn!(
                execution_id = %event.execution_id,
                pipeline_id = %event.pipeline_id,
                rows_processed = event.rows_processed,
                errors = ?event.errors,
                "pipeline execution failed"
            );
        } else {
            info!(
                execution_id = %event.execution_id,
                pipeline_id = %event.pipeline_id,
                rows_processed = event.rows_processed,
                "pipeline execution completed"
            );
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event: &CompletionEvent) {
        Self::log(event);
    }

    fn try_emit(&self, event: &CompletionEvent) {
        Self::log(event);
    }
}

/// Collects events in memory, for tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<CompletionEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<CompletionEvent> {
        self.events.read().clone()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event: &CompletionEvent) {
        self.events.write().push(event.clone());
    }

    fn try_emit(&self, event: &CompletionEvent) {
        self.events.write().push(event.clone());
    }
}
