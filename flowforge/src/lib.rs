//! # Flowforge
//!
//! An ETL pipeline execution engine.
//!
//! Flowforge accepts a user-authored directed graph of processing
//! nodes, validates it, determines a deterministic execution order, and
//! runs each node against the output of its predecessors, recording
//! per-node and pipeline-level statistics:
//!
//! - **Graph model and validation**: source/destination presence, edge
//!   referential integrity, acyclicity
//! - **Deterministic scheduling**: stable topological order via Kahn's
//!   algorithm
//! - **Node processors**: transform, filter, aggregate, join, plus
//!   connector-backed sources and destinations
//! - **Failure isolation**: row-level errors drop the row and continue;
//!   node-level errors abort the run and mark it failed
//! - **Execution tracking**: pollable in-progress state, persisted
//!   terminal records, completion events
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowforge::prelude::*;
//!
//! let pipeline = PipelineBuilder::new("nightly-sync")
//!     .node(users_source)
//!     .node(adults_filter)
//!     .node(warehouse_dest)
//!     .connect(users_id, filter_id)
//!     .connect(filter_id, dest_id)
//!     .build()?;
//!
//! let handle = engine.execute(pipeline)?;
//! let done = tracker.get(handle.id);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod builder;
pub mod catalog;
pub mod connectors;
pub mod core;
pub mod engine;
pub mod errors;
pub mod events;
pub mod expr;
pub mod graph;
pub mod observability;
pub mod processors;
pub mod store;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builder::PipelineBuilder;
    pub use crate::connectors::{
        ConnectorRegistry, DestinationConnector, MemorySink, SourceConnector, StaticSource,
    };
    pub use crate::core::{
        Execution, ExecutionStatus, NodeStats, Record, ResultMetadata, TransformationResult,
    };
    pub use crate::engine::{ExecutionEngine, ExecutionTracker};
    pub use crate::errors::{EngineError, NodeError, ValidationError};
    pub use crate::events::{CompletionEvent, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::graph::{
        AggregateConfig, AggregateOp, Aggregation, ConvertType, DestinationConfig,
        DestinationKind, Edge, FilterCondition, FilterConfig, FilterOperator, JoinConfig,
        JoinType, Node, NodeKind, Pipeline, PipelineStatus, Schedule, SourceConfig, SourceKind,
        TransformConfig, TransformOp,
    };
    pub use crate::store::{
        ExecutionStore, InMemoryExecutionStore, InMemoryPipelineStore, PipelineChanges,
        PipelineStore,
    };
    pub use crate::utils::{generate_uuid, iso_timestamp};
}
