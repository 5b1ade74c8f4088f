//! Persistence boundaries for pipelines and execution records.
//!
//! The engine works against these traits; the in-memory implementations
//! back tests and single-process deployments. The pipeline store runs
//! the graph validator before persisting, so an invalid pipeline never
//! reaches storage.

use crate::core::Execution;
use crate::errors::ValidationError;
use crate::graph::{self, Edge, Node, Pipeline, PipelineStatus, Schedule};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Errors from the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No pipeline with the given id.
    #[error("pipeline {0} not found")]
    NotFound(Uuid),

    /// The submitted graph failed structural validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

/// Partial update applied to a stored pipeline. Absent fields are left
/// unchanged; `nodes` and `edges` are validated as the merged graph.
#[derive(Debug, Clone, Default)]
pub struct PipelineChanges {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Replacement node set.
    pub nodes: Option<Vec<Node>>,
    /// Replacement edge set.
    pub edges: Option<Vec<Edge>>,
    /// New schedule.
    pub schedule: Option<Schedule>,
    /// New lifecycle status.
    pub status: Option<PipelineStatus>,
}

/// Stores pipeline definitions.
#[async_trait]
pub trait PipelineStore: Send + Sync {
    /// Validates and persists a new pipeline.
    async fn create(&self, pipeline: Pipeline) -> Result<Pipeline, StoreError>;

    /// Fetches a pipeline by id.
    async fn get(&self, id: Uuid) -> Result<Pipeline, StoreError>;

    /// Applies a partial update, validating the resulting graph.
    async fn update(&self, id: Uuid, changes: PipelineChanges) -> Result<Pipeline, StoreError>;

    /// Lists all pipelines.
    async fn list(&self) -> Vec<Pipeline>;
}

/// Stores terminal execution records.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    /// Persists a terminal execution record.
    async fn create(&self, execution: Execution) -> Result<(), StoreError>;

    /// Lists executions for a pipeline, most recent first.
    async fn list(&self, pipeline_id: Uuid, limit: usize) -> Vec<Execution>;
}

/// In-memory pipeline store.
#[derive(Default)]
pub struct InMemoryPipelineStore {
    pipelines: RwLock<HashMap<Uuid, Pipeline>>,
}

impl InMemoryPipelineStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PipelineStore for InMemoryPipelineStore {
    async fn create(&self, pipeline: Pipeline) -> Result<Pipeline, StoreError> {
        graph::validate(&pipeline.nodes, &pipeline.edges)?;
        self.pipelines.write().insert(pipeline.id, pipeline.clone());
        Ok(pipeline)
    }

    async fn get(&self, id: Uuid) -> Result<Pipeline, StoreError> {
        self.pipelines
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: Uuid, changes: PipelineChanges) -> Result<Pipeline, StoreError> {
        let mut updated = self.get(id).await?;

        if let Some(name) = changes.name {
            updated.name = name;
        }
        if let Some(description) = changes.description {
            updated.description = Some(description);
        }
        if let Some(nodes) = changes.nodes {
            updated.nodes = nodes;
        }
        if let Some(edges) = changes.edges {
            updated.edges = edges;
        }
        if let Some(schedule) = changes.schedule {
            updated.schedule = Some(schedule);
        }
        if let Some(status) = changes.status {
            updated.status = status;
        }

        // The merged graph must still be valid; the stored pipeline is
        // untouched when it is not.
        graph::validate(&updated.nodes, &updated.edges)?;

        self.pipelines.write().insert(id, updated.clone());
        Ok(updated)
    }

    async fn list(&self) -> Vec<Pipeline> {
        self.pipelines.read().values().cloned().collect()
    }
}

/// In-memory execution store.
#[derive(Default)]
pub struct InMemoryExecutionStore {
    executions: RwLock<Vec<Execution>>,
}

impl InMemoryExecutionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionStore for InMemoryExecutionStore {
    async fn create(&self, execution: Execution) -> Result<(), StoreError> {
        self.executions.write().push(execution);
        Ok(())
    }

    async fn list(&self, pipeline_id: Uuid, limit: usize) -> Vec<Execution> {
        let mut matching: Vec<Execution> = self
            .executions
            .read()
            .iter()
            .filter(|e| e.pipeline_id == pipeline_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        matching.truncate(limit);
        matching
    }
}
