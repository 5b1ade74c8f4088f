//! Node processors: one algorithm per node kind.
//!
//! Every processor shares the same output contract, a
//! [`TransformationResult`] carrying the produced records plus row
//! accounting. Inputs arrive as ordered `(predecessor id, records)`
//! pairs; all kinds except `join` consume them concatenated in
//! edge-declaration order.

pub mod aggregate;
pub mod filter;
pub mod join;
pub mod transform;

use crate::connectors::ConnectorRegistry;
use crate::core::{Record, TransformationResult};
use crate::errors::NodeError;
use crate::graph::{DestinationConfig, Node, NodeKind, SourceConfig};
use uuid::Uuid;

/// Ordered predecessor outputs feeding a node.
pub type NodeInputs = [(Uuid, Vec<Record>)];

/// Dispatches a node to its processor.
///
/// # Errors
///
/// Returns [`NodeError`] on node-level failures: connector errors,
/// missing connector registrations, or invalid node configuration.
/// Row-scoped failures are reported in the result metadata instead.
pub async fn process(
    node: &Node,
    inputs: &NodeInputs,
    connectors: &ConnectorRegistry,
) -> Result<TransformationResult, NodeError> {
    match &node.kind {
        NodeKind::Source(config) => fetch_source(config, connectors).await,
        NodeKind::Transform(config) => transform::apply(config, concatenated(inputs)),
        NodeKind::Filter(config) => Ok(filter::apply(config, concatenated(inputs))),
        NodeKind::Aggregate(config) => Ok(aggregate::apply(config, concatenated(inputs))),
        NodeKind::Join(config) => join::apply(config, inputs),
        NodeKind::Destination(config) => {
            write_destination(config, concatenated(inputs), connectors).await
        }
    }
}

/// Concatenates predecessor outputs in edge-declaration order. A
/// deliberate simplification for multi-input nodes; only `join` treats
/// its inputs separately.
fn concatenated(inputs: &NodeInputs) -> Vec<Record> {
    inputs
        .iter()
        .flat_map(|(_, records)| records.iter().cloned())
        .collect()
}

async fn fetch_source(
    config: &SourceConfig,
    connectors: &ConnectorRegistry,
) -> Result<TransformationResult, NodeError> {
    let connector = connectors.source(config.kind).ok_or_else(|| {
        NodeError::new(format!(
            "no source connector registered for kind '{}'",
            config.kind
        ))
    })?;
    let records = connector
        .fetch(&config.options)
        .await
        .map_err(|err| NodeError::from_connector(&err))?;
    Ok(TransformationResult::sourced(records))
}

async fn write_destination(
    config: &DestinationConfig,
    records: Vec<Record>,
    connectors: &ConnectorRegistry,
) -> Result<TransformationResult, NodeError> {
    let connector = connectors.destination(config.kind).ok_or_else(|| {
        NodeError::new(format!(
            "no destination connector registered for kind '{}'",
            config.kind
        ))
    })?;
    connector
        .write(&config.options, &records)
        .await
        .map_err(|err| NodeError::from_connector(&err))?;
    Ok(TransformationResult::pass_through(records))
}
