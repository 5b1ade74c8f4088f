//! Drives a validated pipeline through its processors, sequentially in
//! topological order, and records results with the tracker.

use crate::connectors::ConnectorRegistry;
use crate::core::{Execution, ExecutionStatus, NodeStats, Record};
use crate::engine::ExecutionTracker;
use crate::errors::EngineError;
use crate::graph::{self, Edge, Pipeline};
use crate::processors;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Executes pipelines as detached asynchronous runs.
///
/// `execute` validates, registers a pending execution, spawns the run
/// as a fire-and-forget tokio task, and returns the handle snapshot
/// immediately. Callers poll the tracker or subscribe to completion
/// events for the outcome. Runs of different pipelines share nothing
/// but the tracker registry, so any number may execute concurrently.
pub struct ExecutionEngine {
    connectors: Arc<ConnectorRegistry>,
    tracker: Arc<ExecutionTracker>,
}

impl ExecutionEngine {
    /// Creates an engine using the given connector registry and tracker.
    #[must_use]
    pub fn new(connectors: Arc<ConnectorRegistry>, tracker: Arc<ExecutionTracker>) -> Self {
        Self {
            connectors,
            tracker,
        }
    }

    /// The tracker this engine reports to, for status polling.
    #[must_use]
    pub fn tracker(&self) -> &Arc<ExecutionTracker> {
        &self.tracker
    }

    /// Starts a run of the pipeline.
    ///
    /// Validation runs defensively even for pipelines that were
    /// validated at persistence time, since definitions may have been
    /// imported or migrated. The returned `Execution` is the pending
    /// handle; the run itself proceeds in the background.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` for a structurally invalid
    /// pipeline, before any execution state is created.
    pub fn execute(&self, pipeline: Pipeline) -> Result<Execution, EngineError> {
        graph::validate(&pipeline.nodes, &pipeline.edges)?;
        let order: Vec<Uuid> = graph::execution_order(&pipeline.nodes, &pipeline.edges)?
            .iter()
            .map(|node| node.id)
            .collect();

        let handle = self.tracker.register(pipeline.id);
        let execution_id = handle.id;
        let connectors = Arc::clone(&self.connectors);
        let tracker = Arc::clone(&self.tracker);

        tokio::spawn(async move {
            run(&pipeline, &order, execution_id, &tracker, &connectors).await;
        });

        Ok(handle)
    }
}

async fn run(
    pipeline: &Pipeline,
    order: &[Uuid],
    execution_id: Uuid,
    tracker: &ExecutionTracker,
    connectors: &ConnectorRegistry,
) {
    tracker.mark_running(execution_id);
    info!(
        pipeline = %pipeline.name,
        execution_id = %execution_id,
        nodes = order.len(),
        "pipeline run started"
    );

    let mut outputs: HashMap<Uuid, Vec<Record>> = HashMap::new();
    let mut failed = false;

    for &node_id in order {
        let Some(node) = pipeline.node(node_id) else {
            tracker.append_error(
                execution_id,
                format!("scheduled node {node_id} missing from pipeline"),
            );
            failed = true;
            break;
        };

        let inputs = resolve_inputs(&pipeline.edges, node_id, &outputs);
        let started = Instant::now();

        match processors::process(node, &inputs, connectors).await {
            Ok(result) => {
                let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
                debug!(
                    node = %node.name,
                    kind = node.kind.type_name(),
                    rows_in = result.metadata.input_rows,
                    rows_out = result.metadata.output_rows,
                    dropped = result.metadata.dropped_rows,
                    row_errors = result.metadata.errors.len(),
                    duration_ms,
                    "node completed"
                );
                tracker.record_node(
                    execution_id,
                    node.id,
                    NodeStats {
                        processed: result.metadata.input_rows as u64,
                        errors: result.metadata.errors.len() as u64,
                        duration_ms,
                    },
                );
                // Pipeline-wide row count tallies rows delivered, i.e.
                // the output of destination nodes; intermediate node
                // output is visible through per-node stats instead.
                if node.kind.is_destination() {
                    tracker.add_rows(execution_id, result.metadata.output_rows as u64);
                }
                outputs.insert(node.id, result.records);
            }
            Err(err) => {
                warn!(
                    node = %node.name,
                    error = %err,
                    "node failed, aborting remainder of run"
                );
                tracker.append_error(execution_id, format!("{}: {}", node.name, err));
                failed = true;
                break;
            }
        }
    }

    let status = if failed {
        ExecutionStatus::Failed
    } else {
        ExecutionStatus::Completed
    };
    tracker.finalize(execution_id, status).await;
    info!(
        pipeline = %pipeline.name,
        execution_id = %execution_id,
        status = %status,
        "pipeline run finished"
    );
}

/// Looks up the recorded outputs of a node's direct predecessors, in
/// edge-declaration order. Zero predecessors means empty input; that is
/// only meaningful for source nodes, which ignore their input anyway.
fn resolve_inputs(
    edges: &[Edge],
    node_id: Uuid,
    outputs: &HashMap<Uuid, Vec<Record>>,
) -> Vec<(Uuid, Vec<Record>)> {
    edges
        .iter()
        .filter(|edge| edge.target == node_id)
        .map(|edge| {
            (
                edge.source,
                outputs.get(&edge.source).cloned().unwrap_or_default(),
            )
        })
        .collect()
}
