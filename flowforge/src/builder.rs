//! Fluent pipeline construction with validation on build.

use crate::errors::ValidationError;
use crate::graph::{self, Edge, Node, Pipeline, PipelineStatus, Schedule};
use uuid::Uuid;

/// Builder for structurally valid pipelines.
///
/// Nodes and edges accumulate in declaration order; `build` runs the
/// graph validator, so a pipeline cannot be constructed through the
/// builder in an invalid state.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    name: String,
    description: Option<String>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    schedule: Option<Schedule>,
    status: PipelineStatus,
}

impl PipelineBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            schedule: None,
            status: PipelineStatus::Draft,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a node.
    #[must_use]
    pub fn node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Connects two nodes by id. Edge declaration order matters: it is
    /// the input concatenation order for multi-input nodes and the
    /// left/right assignment for joins.
    #[must_use]
    pub fn connect(mut self, source: Uuid, target: Uuid) -> Self {
        self.edges.push(Edge::new(source, target));
        self
    }

    /// Adds a pre-built edge, for callers that need handles.
    #[must_use]
    pub fn edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Sets the cron schedule.
    #[must_use]
    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Sets the lifecycle status.
    #[must_use]
    pub fn status(mut self, status: PipelineStatus) -> Self {
        self.status = status;
        self
    }

    /// Validates the graph and builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] the graph validator finds.
    pub fn build(self) -> Result<Pipeline, ValidationError> {
        graph::validate(&self.nodes, &self.edges)?;

        let mut pipeline = Pipeline::new(self.name);
        pipeline.description = self.description;
        pipeline.nodes = self.nodes;
        pipeline.edges = self.edges;
        pipeline.schedule = self.schedule;
        pipeline.status = self.status;
        Ok(pipeline)
    }
}
