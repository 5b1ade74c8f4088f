//! Error types for the flowforge engine.

use thiserror::Error;
use uuid::Uuid;

/// Structural validation failure for a submitted pipeline graph.
///
/// Surfaced synchronously to the caller of create/update; an invalid
/// pipeline is never persisted and never executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No node of the source kind is present.
    #[error("pipeline has no source node")]
    MissingSource,

    /// No node of the destination kind is present.
    #[error("pipeline has no destination node")]
    MissingDestination,

    /// An edge references a node id absent from the pipeline.
    #[error("edge {edge} references unknown node {node}")]
    DanglingEdge {
        /// The offending edge.
        edge: Uuid,
        /// The missing node id.
        node: Uuid,
    },

    /// The directed graph formed by the edges contains a cycle.
    #[error("cycle detected in pipeline: {}", path.join(" -> "))]
    CycleDetected {
        /// Node names along the cycle, ending at the repeated node.
        path: Vec<String>,
    },
}

/// A failure that aborts the remainder of a run.
///
/// Covers connector failures, missing connector registrations, and
/// invalid node configuration discovered at execution time. Row-scoped
/// failures are not represented here; they travel as data in
/// [`crate::core::ResultMetadata::errors`].
#[derive(Debug, Error)]
#[error("{message}")]
pub struct NodeError {
    /// Human-readable failure description.
    pub message: String,
}

impl NodeError {
    /// Creates a new node-level error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Wraps an opaque error raised by a connector adapter.
    #[must_use]
    pub fn from_connector(err: &anyhow::Error) -> Self {
        Self {
            message: format!("{err:#}"),
        }
    }
}

/// The top-level error type for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The pipeline failed structural validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// An invariant the engine relies on was broken.
    #[error("internal error: {0}")]
    Internal(String),
}
