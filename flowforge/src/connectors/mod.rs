//! Connector boundary: pluggable source and destination adapters.
//!
//! The engine never talks to databases, APIs, files, or warehouses
//! directly. It resolves an adapter from the registry by connector kind
//! and delegates. Adapters may raise; the engine treats that as a
//! node-level failure for the run.

use crate::core::Record;
use crate::graph::{DestinationKind, SourceKind};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Reads the initial record list for a source node.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// Fetches records. `options` comes verbatim from the node config.
    async fn fetch(&self, options: &Value) -> anyhow::Result<Vec<Record>>;
}

/// Writes the final record list for a destination node.
///
/// The write is assumed to either fully succeed or raise.
#[async_trait]
pub trait DestinationConnector: Send + Sync {
    /// Writes records. `options` comes verbatim from the node config.
    async fn write(&self, options: &Value, records: &[Record]) -> anyhow::Result<()>;
}

/// Registry mapping connector kinds to registered adapters.
#[derive(Default)]
pub struct ConnectorRegistry {
    sources: RwLock<HashMap<SourceKind, Arc<dyn SourceConnector>>>,
    destinations: RwLock<HashMap<DestinationKind, Arc<dyn DestinationConnector>>>,
}

impl ConnectorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source adapter for a kind, replacing any previous one.
    pub fn register_source(&self, kind: SourceKind, connector: Arc<dyn SourceConnector>) {
        self.sources.write().insert(kind, connector);
    }

    /// Registers a destination adapter for a kind, replacing any
    /// previous one.
    pub fn register_destination(
        &self,
        kind: DestinationKind,
        connector: Arc<dyn DestinationConnector>,
    ) {
        self.destinations.write().insert(kind, connector);
    }

    /// Resolves the source adapter for a kind.
    #[must_use]
    pub fn source(&self, kind: SourceKind) -> Option<Arc<dyn SourceConnector>> {
        self.sources.read().get(&kind).cloned()
    }

    /// Resolves the destination adapter for a kind.
    #[must_use]
    pub fn destination(&self, kind: DestinationKind) -> Option<Arc<dyn DestinationConnector>> {
        self.destinations.read().get(&kind).cloned()
    }
}

/// In-memory source returning a fixed record list. Useful for tests and
/// local pipeline development.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<Record>,
}

impl StaticSource {
    /// Creates a source that yields the given records on every fetch.
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl SourceConnector for StaticSource {
    async fn fetch(&self, _options: &Value) -> anyhow::Result<Vec<Record>> {
        Ok(self.records.clone())
    }
}

/// In-memory destination capturing everything written to it.
#[derive(Default)]
pub struct MemorySink {
    written: RwLock<Vec<Record>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything written so far.
    #[must_use]
    pub fn written(&self) -> Vec<Record> {
        self.written.read().clone()
    }
}

#[async_trait]
impl DestinationConnector for MemorySink {
    async fn write(&self, _options: &Value, records: &[Record]) -> anyhow::Result<()> {
        self.written.write().extend_from_slice(records);
        Ok(())
    }
}

/// Source double that always fails, for exercising node-level failure
/// paths.
#[derive(Debug, Clone)]
pub struct FailingSource {
    message: String,
}

impl FailingSource {
    /// Creates a source that fails with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl SourceConnector for FailingSource {
    async fn fetch(&self, _options: &Value) -> anyhow::Result<Vec<Record>> {
        anyhow::bail!("{}", self.message)
    }
}

/// Destination double that always fails.
#[derive(Debug, Clone)]
pub struct FailingSink {
    message: String,
}

impl FailingSink {
    /// Creates a destination that fails with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DestinationConnector for FailingSink {
    async fn write(&self, _options: &Value, _records: &[Record]) -> anyhow::Result<()> {
        anyhow::bail!("{}", self.message)
    }
}
